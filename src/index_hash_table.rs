//! Hash table over externally owned integer elements.
//!
//! An [`IndexHashTable`] does not know what its elements are: hashing and
//! equality come from a [`HashFunction`] that typically looks the element
//! up in some other structure (a vertex handle resolved to its
//! coordinates, for instance). A lookup may also go through a
//! `Descriptor`, which is a key of the same identity as an element but of a
//! different shape; this allows searching for a value before any element
//! holding it exists.
use log::trace;
use slab::Slab;

pub const DEFAULT_TABLE_CAPACITY: usize = 16;

/// Hashing and equality strategy for an [`IndexHashTable`].
///
/// Implementations must keep the two hashes consistent: when
/// `equal_descriptor(d, e)` holds, `get_descriptor_hash(d)` must equal
/// `get_hash(e)`.
pub trait HashFunction {
    type Descriptor: ?Sized;

    fn get_hash(&self, element: usize) -> u64;
    fn equal(&self, element_1: usize, element_2: usize) -> bool;
    fn get_descriptor_hash(&self, descriptor: &Self::Descriptor) -> u64;
    fn equal_descriptor(&self, descriptor: &Self::Descriptor, element: usize) -> bool;
}

#[derive(Debug, Clone)]
struct Node {
    element: usize,
    hash: u64,
    next: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    head: Option<usize>,
    tail: Option<usize>,
}

/// Chained hash table mapping elements to stable node handles.
///
/// Equal elements may be added more than once; they coexist, and a bucket
/// keeps its nodes in insertion order.
#[derive(Debug)]
pub struct IndexHashTable<H: HashFunction> {
    hash_function: H,
    nodes: Slab<Node>,
    buckets: Vec<Bucket>,
}

impl<H: HashFunction> IndexHashTable<H> {
    pub fn new(capacity_hint: usize, hash_function: H) -> Self {
        let bucket_count = capacity_hint.max(DEFAULT_TABLE_CAPACITY).next_power_of_two();
        IndexHashTable {
            hash_function,
            nodes: Slab::with_capacity(capacity_hint),
            buckets: vec![Bucket::default(); bucket_count],
        }
    }

    pub fn hash_function(&self) -> &H {
        &self.hash_function
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    fn bucket_of(&self, hash: u64) -> usize {
        (hash as usize) & (self.buckets.len() - 1)
    }

    /// Add `element` and return its node.
    pub fn add_element(&mut self, element: usize) -> usize {
        if self.nodes.len() >= self.buckets.len() {
            self.grow();
        }
        let hash = self.hash_function.get_hash(element);
        let node = self.nodes.insert(Node {
            element,
            hash,
            next: None,
        });
        self.link_tail(node);
        node
    }

    fn link_tail(&mut self, node: usize) {
        let bucket = self.bucket_of(self.nodes[node].hash);
        let slot = &mut self.buckets[bucket];
        match slot.tail {
            Some(tail) => {
                slot.tail = Some(node);
                self.nodes[tail].next = Some(node);
            }
            None => {
                slot.head = Some(node);
                slot.tail = Some(node);
            }
        }
    }

    fn grow(&mut self) {
        let len = 2 * self.buckets.len().max(1);
        let old = std::mem::replace(&mut self.buckets, vec![Bucket::default(); len]);
        trace!("index hash table: rehash into {} buckets", self.buckets.len());
        for bucket in old {
            let mut cursor = bucket.head;
            while let Some(node) = cursor {
                cursor = self.nodes[node].next.take();
                self.link_tail(node);
            }
        }
    }

    /// Element stored at `node`.
    #[inline]
    pub fn get_element(&self, node: usize) -> usize {
        self.nodes[node].element
    }

    /// First node holding an element equal to `element`.
    pub fn find_node(&self, element: usize) -> Option<usize> {
        let hash = self.hash_function.get_hash(element);
        self.find_from(self.buckets[self.bucket_of(hash)].head, hash, |h, e| {
            h.equal(element, e)
        })
    }

    /// First node holding an element equal to `descriptor`.
    pub fn find_node_by_descriptor(&self, descriptor: &H::Descriptor) -> Option<usize> {
        let hash = self.hash_function.get_descriptor_hash(descriptor);
        self.find_from(self.buckets[self.bucket_of(hash)].head, hash, |h, e| {
            h.equal_descriptor(descriptor, e)
        })
    }

    /// Next node after `node` holding an element equal to `node`'s.
    pub fn get_next_node(&self, node: usize) -> Option<usize> {
        let Node {
            element, hash, next, ..
        } = self.nodes[node];
        self.find_from(next, hash, |h, e| h.equal(element, e))
    }

    fn find_from<F: Fn(&H, usize) -> bool>(
        &self,
        mut cursor: Option<usize>,
        hash: u64,
        is_equal: F,
    ) -> Option<usize> {
        while let Some(node) = cursor {
            let entry = &self.nodes[node];
            if entry.hash == hash && is_equal(&self.hash_function, entry.element) {
                return Some(node);
            }
            cursor = entry.next;
        }
        None
    }

    /// Remove the first node holding an element equal to `element`.
    ///
    /// Returns `false` if there was none.
    pub fn delete_element(&mut self, element: usize) -> bool {
        match self.find_node(element) {
            Some(node) => {
                self.delete_node(node);
                true
            }
            None => false,
        }
    }

    /// Remove `node`; the handle may be reissued by later additions.
    pub fn delete_node(&mut self, node: usize) {
        let hash = self.nodes[node].hash;
        let bucket = self.bucket_of(hash);
        let next = self.nodes[node].next;

        let mut prev = None;
        let mut cursor = self.buckets[bucket].head;
        while let Some(current) = cursor {
            if current == node {
                break;
            }
            prev = Some(current);
            cursor = self.nodes[current].next;
        }
        assert_eq!(cursor, Some(node), "node {node} not linked in its bucket");

        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.buckets[bucket].head = next,
        }
        if self.buckets[bucket].tail == Some(node) {
            self.buckets[bucket].tail = prev;
        }
        self.nodes.remove(node);
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.buckets
            .iter_mut()
            .for_each(|b| *b = Bucket::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Elements are indices into a value list; descriptors are values.
    struct ValueHash<'a> {
        values: &'a [f64],
    }

    impl<'a> HashFunction for ValueHash<'a> {
        type Descriptor = f64;

        fn get_hash(&self, element: usize) -> u64 {
            self.get_descriptor_hash(&self.values[element])
        }

        fn equal(&self, element_1: usize, element_2: usize) -> bool {
            self.values[element_1] == self.values[element_2]
        }

        fn get_descriptor_hash(&self, descriptor: &f64) -> u64 {
            descriptor.to_bits().wrapping_mul(0x9e37_79b9_7f4a_7c15) >> 7
        }

        fn equal_descriptor(&self, descriptor: &f64, element: usize) -> bool {
            *descriptor == self.values[element]
        }
    }

    /// Everything collides.
    struct Constant;

    impl HashFunction for Constant {
        type Descriptor = usize;

        fn get_hash(&self, _element: usize) -> u64 {
            7
        }
        fn equal(&self, element_1: usize, element_2: usize) -> bool {
            element_1 == element_2
        }
        fn get_descriptor_hash(&self, _descriptor: &usize) -> u64 {
            7
        }
        fn equal_descriptor(&self, descriptor: &usize, element: usize) -> bool {
            *descriptor == element
        }
    }

    #[test]
    fn add_find_delete() {
        let values: Vec<f64> = (0..100).map(|i| i as f64 * 0.5).collect();
        let mut table = IndexHashTable::new(4, ValueHash { values: &values });

        for e in 0..values.len() {
            assert_eq!(table.find_node(e), None);
            let node = table.add_element(e);
            assert_eq!(table.find_node(e), Some(node));
            assert_eq!(table.get_element(node), e);
        }
        assert_eq!(table.size(), 100);

        let node = table.find_node_by_descriptor(&12.5).unwrap();
        assert_eq!(table.get_element(node), 25);
        assert_eq!(table.find_node_by_descriptor(&12.25), None);

        for e in (0..values.len()).step_by(2) {
            assert!(table.delete_element(e));
            assert_eq!(table.find_node(e), None);
        }
        assert!(!table.delete_element(0));
        for e in (1..values.len()).step_by(2) {
            assert!(table.find_node(e).is_some());
        }
        assert_eq!(table.size(), 50);
    }

    #[test]
    fn rehash_keeps_every_node() {
        let values: Vec<f64> = (0..64).map(|i| i as f64).collect();
        let mut table = IndexHashTable::new(0, ValueHash { values: &values });
        let nodes: Vec<_> = (0..values.len()).map(|e| table.add_element(e)).collect();
        assert_eq!(table.size(), 64);
        for (e, node) in nodes.iter().enumerate() {
            assert_eq!(table.find_node(e), Some(*node));
            assert_eq!(table.find_node_by_descriptor(&(e as f64)), Some(*node));
        }
    }

    #[test]
    fn colliding_elements() {
        let mut table = IndexHashTable::new(0, Constant);
        let nodes: Vec<_> = (0..10).map(|e| table.add_element(e)).collect();
        for (e, node) in nodes.iter().enumerate() {
            assert_eq!(table.find_node(e), Some(*node));
        }
        table.delete_node(nodes[0]);
        table.delete_node(nodes[9]);
        table.delete_element(4);
        assert_eq!(table.find_node(0), None);
        assert_eq!(table.find_node(4), None);
        assert_eq!(table.find_node(9), None);
        assert_eq!(table.find_node(5), Some(nodes[5]));

        // Tail is relinked after deleting the last node.
        let again = table.add_element(9);
        assert_eq!(table.find_node(9), Some(again));
    }

    #[test]
    fn duplicates_in_insertion_order() {
        let values = vec![1., 2., 1., 1.];
        let mut table = IndexHashTable::new(8, ValueHash { values: &values });
        let a = table.add_element(0);
        let b = table.add_element(2);
        let c = table.add_element(3);
        table.add_element(1);

        assert_eq!(table.find_node_by_descriptor(&1.), Some(a));
        assert_eq!(table.get_next_node(a), Some(b));
        assert_eq!(table.get_next_node(b), Some(c));
        assert_eq!(table.get_next_node(c), None);

        // Deleting by an equal element removes the first match.
        table.delete_element(3);
        assert_eq!(table.find_node_by_descriptor(&1.), Some(b));

        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.find_node(0), None);
    }
}
