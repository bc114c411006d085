//! Depth bounded region quad tree over [`Envelope2D`]s.
//!
//! The tree covers a fixed root extent; every quad splits into four
//! equal quadrants (numbered counter-clockwise from the north-east one)
//! until the maximum height is reached. Quads are created on demand.
//!
//! Two storage modes are available:
//!
//! 1. By default ([`QuadTree::new`]) an element is stored once, in the
//!    deepest quad that fully contains its box. A query reports every
//!    matching element exactly once.
//! 1. [`QuadTree::new_with_duplicates`] stores a reference to the element
//!    in every deepest-level quad its box intersects; a query may report
//!    the same element more than once.
//!
//! In both modes an element whose box is empty or not inside the root
//! extent is kept in the root quad.
//!
//! Elements are identified by handles returned from [`QuadTree::insert`];
//! the caller's id is recovered through [`QuadTree::get_element`].
use log::{debug, trace};
use serde_derive::{Deserialize, Serialize};
use slab::Slab;

use crate::envelope::Envelope2D;

mod iterator;
mod snapshot;
pub use iterator::{QuadTreeIterator, QueryShape};
use snapshot::QuadTreeSnapshot;

pub const MAX_QUAD_TREE_HEIGHT: usize = 32;
pub const DEFAULT_QUAD_TREE_HEIGHT: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Quad {
    extent: Envelope2D,
    parent: Option<usize>,
    children: [Option<usize>; 4],
    depth: usize,
    /// Element handles stored directly in this quad.
    elements: Vec<usize>,
    /// Element references in this quad and all its descendants.
    subtree_count: usize,
}

impl Quad {
    fn new(extent: Envelope2D, parent: Option<usize>, depth: usize) -> Self {
        Quad {
            extent,
            parent,
            children: [None; 4],
            depth,
            elements: Vec::new(),
            subtree_count: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct Element {
    id: usize,
    extent: Envelope2D,
    /// Quads referencing this element, in insertion order.
    quads: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "QuadTreeSnapshot", into = "QuadTreeSnapshot")]
pub struct QuadTree {
    extent: Envelope2D,
    height: usize,
    store_duplicates: bool,
    quads: Slab<Quad>,
    elements: Slab<Element>,
    root: usize,
    data_extent: Envelope2D,
}

impl QuadTree {
    /// Single-reference tree over `extent`, `height` levels deep
    /// (clamped to `1..=MAX_QUAD_TREE_HEIGHT`).
    pub fn new(extent: Envelope2D, height: usize) -> Self {
        Self::with_mode(extent, height, false)
    }

    /// Tree storing elements in every deepest-level quad they intersect.
    pub fn new_with_duplicates(extent: Envelope2D, height: usize) -> Self {
        Self::with_mode(extent, height, true)
    }

    fn with_mode(extent: Envelope2D, height: usize, store_duplicates: bool) -> Self {
        assert!(!extent.is_empty(), "quad tree requires a non-empty extent");
        let height = height.max(1).min(MAX_QUAD_TREE_HEIGHT);
        let mut quads = Slab::new();
        let root = quads.insert(Quad::new(extent, None, 0));
        debug!(
            "quad tree: extent {:?}, height {}, duplicates {}",
            extent, height, store_duplicates
        );
        QuadTree {
            extent,
            height,
            store_duplicates,
            quads,
            elements: Slab::new(),
            root,
            data_extent: Envelope2D::empty(),
        }
    }

    #[inline]
    pub fn extent(&self) -> Envelope2D {
        self.extent
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn is_storing_duplicates(&self) -> bool {
        self.store_duplicates
    }

    #[inline]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.quads.len()
    }

    /// Union of the boxes of all elements inserted so far.
    #[inline]
    pub fn get_data_extent(&self) -> Envelope2D {
        self.data_extent
    }

    #[inline]
    pub fn get_root(&self) -> usize {
        self.root
    }

    /// Insert `id` with bounding box `extent` and return the element
    /// handle.
    ///
    /// The handle of a previously inserted, spatially close element may be
    /// passed as `hint` to start the descent from its quad. The hint never
    /// changes where the element ends up in a meaningful way, only how fast
    /// it gets there. The returned handle is a good hint for the next one.
    pub fn insert(&mut self, id: usize, extent: Envelope2D, hint: Option<usize>) -> usize {
        let element = self.elements.insert(Element {
            id,
            extent,
            quads: Vec::new(),
        });
        self.data_extent.merge(&extent);

        let in_root = self.quads[self.root].extent.contains(&extent);
        if !in_root {
            self.attach(element, self.root);
        } else if self.store_duplicates {
            self.insert_duplicated(element, &extent);
        } else {
            let start = hint
                .filter(|&h| h != element)
                .and_then(|h| self.elements.get(h))
                .and_then(|e| e.quads.first().copied())
                .map(|quad| self.climb(quad, &extent))
                .unwrap_or(self.root);
            let quad = self.descend(start, &extent);
            self.attach(element, quad);
        }
        element
    }

    /// First ancestor of `quad` (or `quad` itself) containing `extent`.
    fn climb(&self, mut quad: usize, extent: &Envelope2D) -> usize {
        while !self.quads[quad].extent.contains(extent) {
            match self.quads[quad].parent {
                Some(parent) => quad = parent,
                None => break,
            }
        }
        quad
    }

    /// Deepest quad below `quad` containing `extent`, creating quads on
    /// the way.
    fn descend(&mut self, mut quad: usize, extent: &Envelope2D) -> usize {
        loop {
            let node = &self.quads[quad];
            if node.depth + 1 >= self.height {
                return quad;
            }
            let quadrant = (0..4).find(|&i| quadrant_extent(&node.extent, i).contains(extent));
            match quadrant {
                Some(i) => quad = self.child(quad, i),
                None => return quad,
            }
        }
    }

    fn insert_duplicated(&mut self, element: usize, extent: &Envelope2D) {
        let mut stack = vec![self.root];
        while let Some(quad) = stack.pop() {
            let node = &self.quads[quad];
            if node.depth + 1 >= self.height {
                self.attach(element, quad);
                continue;
            }
            let parent_extent = node.extent;
            for i in (0..4).rev() {
                if quadrant_extent(&parent_extent, i).is_intersecting(extent) {
                    let child = self.child(quad, i);
                    stack.push(child);
                }
            }
        }
    }

    fn child(&mut self, quad: usize, quadrant: usize) -> usize {
        if let Some(child) = self.quads[quad].children[quadrant] {
            return child;
        }
        let parent = &self.quads[quad];
        let extent = quadrant_extent(&parent.extent, quadrant);
        let depth = parent.depth + 1;
        let child = self.quads.insert(Quad::new(extent, Some(quad), depth));
        self.quads[quad].children[quadrant] = Some(child);
        trace!("quad tree: new quad {} at depth {} ({:?})", child, depth, extent);
        child
    }

    fn attach(&mut self, element: usize, quad: usize) {
        self.quads[quad].elements.push(element);
        self.elements[element].quads.push(quad);
        self.adjust_counts(quad, |count| count + 1);
    }

    fn adjust_counts<F: Fn(usize) -> usize>(&mut self, quad: usize, op: F) {
        let mut cursor = Some(quad);
        while let Some(q) = cursor {
            let node = &mut self.quads[q];
            node.subtree_count = op(node.subtree_count);
            cursor = node.parent;
        }
    }

    /// Remove the element and return its id. Quads are kept even when they
    /// become empty.
    pub fn remove_element(&mut self, element: usize) -> usize {
        assert!(
            self.elements.contains(element),
            "quad tree element {} does not exist",
            element
        );
        let removed = self.elements.remove(element);
        for &quad in removed.quads.iter() {
            self.quads[quad].elements.retain(|&e| e != element);
            self.adjust_counts(quad, |count| count - 1);
        }
        removed.id
    }

    /// Id the element was inserted with.
    #[inline]
    pub fn get_element(&self, element: usize) -> usize {
        self.elements[element].id
    }

    #[inline]
    pub fn get_element_extent(&self, element: usize) -> Envelope2D {
        self.elements[element].extent
    }

    /// Quad holding the element; the first one in duplicate-storage mode.
    #[inline]
    pub fn get_quad(&self, element: usize) -> usize {
        self.elements[element].quads[0]
    }

    /// All quads referencing the element.
    pub fn get_quads(&self, element: usize) -> &[usize] {
        &self.elements[element].quads
    }

    #[inline]
    pub fn get_extent(&self, quad: usize) -> Envelope2D {
        self.quads[quad].extent
    }

    #[inline]
    pub fn get_parent(&self, quad: usize) -> Option<usize> {
        self.quads[quad].parent
    }

    #[inline]
    pub fn get_child(&self, quad: usize, quadrant: usize) -> Option<usize> {
        self.quads[quad].children[quadrant]
    }

    #[inline]
    pub fn get_depth(&self, quad: usize) -> usize {
        self.quads[quad].depth
    }

    /// Element references stored in `quad` and its descendants.
    #[inline]
    pub fn get_sub_tree_element_count(&self, quad: usize) -> usize {
        self.quads[quad].subtree_count
    }

    /// Element references stored directly in `quad`.
    #[inline]
    pub fn get_quad_element_count(&self, quad: usize) -> usize {
        self.quads[quad].elements.len()
    }

    pub fn element_handles(&self) -> impl Iterator<Item = usize> + '_ {
        self.elements.iter().map(|(handle, _)| handle)
    }

    pub fn quad_handles(&self) -> impl Iterator<Item = usize> + '_ {
        self.quads.iter().map(|(handle, _)| handle)
    }

    /// Iterator that yields nothing until
    /// [`reset_iterator`](QuadTreeIterator::reset_iterator) is called.
    pub fn iterator(&self) -> QuadTreeIterator<'_> {
        QuadTreeIterator::new(self)
    }

    /// Iterator over element handles whose box matches `query` within
    /// `tolerance`.
    pub fn get_iterator<Q: Into<QueryShape>>(&self, query: Q, tolerance: f64) -> QuadTreeIterator<'_> {
        let mut iter = QuadTreeIterator::new(self);
        iter.reset_iterator(query, tolerance);
        iter
    }
}

/// Extent of one of the four quadrants of `extent`: 0 is north-east, 1
/// north-west, 2 south-west and 3 south-east.
fn quadrant_extent(extent: &Envelope2D, quadrant: usize) -> Envelope2D {
    let c = extent.center();
    match quadrant {
        0 => Envelope2D::new(c.x, c.y, extent.xmax, extent.ymax),
        1 => Envelope2D::new(extent.xmin, c.y, c.x, extent.ymax),
        2 => Envelope2D::new(extent.xmin, extent.ymin, c.x, c.y),
        3 => Envelope2D::new(c.x, extent.ymin, extent.xmax, c.y),
        _ => unreachable!("quadrant index {} out of range", quadrant),
    }
}

#[cfg(test)]
mod tests {
    use geo::Line;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::init_log;

    fn sorted_ids(tree: &QuadTree, iter: QuadTreeIterator<'_>) -> Vec<usize> {
        let mut ids: Vec<_> = iter.map(|h| tree.get_element(h)).collect();
        ids.sort_unstable();
        ids
    }

    fn random_boxes(rng: &mut StdRng, n: usize) -> Vec<Envelope2D> {
        (0..n)
            .map(|_| {
                let x = rng.gen_range(0.0..100.0);
                let y = rng.gen_range(0.0..100.0);
                let w = rng.gen_range(0.0..5.0);
                let h = rng.gen_range(0.0..5.0);
                Envelope2D::new(x, y, x + w, y + h)
            })
            .collect()
    }

    #[test]
    fn placement() {
        init_log();
        let mut tree = QuadTree::new(Envelope2D::new(0., 0., 8., 8.), 4);
        let small = tree.insert(0, Envelope2D::new(6.5, 6.5, 7., 7.), None);
        let straddle = tree.insert(1, Envelope2D::new(3., 3., 5., 5.), None);
        let outside = tree.insert(2, Envelope2D::new(7., 7., 9., 9.), None);

        assert_eq!(tree.get_depth(tree.get_quad(small)), 3);
        assert_eq!(tree.get_extent(tree.get_quad(small)), Envelope2D::new(6., 6., 7., 7.));
        assert_eq!(tree.get_quad(straddle), tree.get_root());
        assert_eq!(tree.get_quad(outside), tree.get_root());

        assert_eq!(tree.element_count(), 3);
        assert_eq!(tree.get_sub_tree_element_count(tree.get_root()), 3);
        assert_eq!(tree.get_quad_element_count(tree.get_root()), 2);
        assert_eq!(tree.get_data_extent(), Envelope2D::new(3., 3., 9., 9.));
    }

    #[test]
    fn empty_tree_yields_nothing() {
        let tree = QuadTree::new(Envelope2D::new(0., 0., 1., 1.), DEFAULT_QUAD_TREE_HEIGHT);
        assert_eq!(tree.get_iterator(Envelope2D::new(0., 0., 1., 1.), 0.).next(), None);
        assert_eq!(tree.iterator().next(), None);
    }

    #[test]
    fn hint_does_not_change_results() {
        let mut rng = StdRng::seed_from_u64(3);
        let boxes = random_boxes(&mut rng, 500);
        let extent = Envelope2D::new(0., 0., 105., 105.);
        let mut plain = QuadTree::new(extent, 8);
        let mut hinted = QuadTree::new(extent, 8);
        let mut hint = None;
        for (id, b) in boxes.iter().enumerate() {
            plain.insert(id, *b, None);
            hint = Some(hinted.insert(id, *b, hint));
        }

        let mut iter_plain = plain.iterator();
        let mut iter_hinted = hinted.iterator();
        for q in random_boxes(&mut rng, 50) {
            iter_plain.reset_iterator(q, 0.5);
            iter_hinted.reset_iterator(q, 0.5);
            let expected: Vec<_> = (0..boxes.len())
                .filter(|&i| q.inflate(0.5, 0.5).is_intersecting(&boxes[i]))
                .collect();
            assert_eq!(sorted_ids(&plain, iter_plain.clone()), expected);
            assert_eq!(sorted_ids(&hinted, iter_hinted.clone()), expected);
        }
    }

    #[test]
    fn segment_queries() {
        let mut rng = StdRng::seed_from_u64(5);
        let boxes = random_boxes(&mut rng, 400);
        let mut tree = QuadTree::new(Envelope2D::new(0., 0., 105., 105.), 6);
        for (id, b) in boxes.iter().enumerate() {
            tree.insert(id, *b, None);
        }

        let mut iter = tree.iterator();
        for _ in 0..50 {
            let line = Line::from([
                (rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)),
                (rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)),
            ]);
            iter.reset_iterator(line, 0.25);
            let expected: Vec<_> = (0..boxes.len())
                .filter(|&i| boxes[i].is_intersecting_line(&line, 0.25))
                .collect();
            assert_eq!(sorted_ids(&tree, iter.clone()), expected);
        }
    }

    #[test]
    fn duplicate_storage() {
        let mut tree = QuadTree::new_with_duplicates(Envelope2D::new(0., 0., 4., 4.), 2);
        let center = tree.insert(7, Envelope2D::new(1., 1., 3., 3.), None);
        assert_eq!(tree.get_quads(center).len(), 4);
        assert_eq!(tree.get_sub_tree_element_count(tree.get_root()), 4);

        // The query touches a single quadrant, so the element is seen once.
        let ids = sorted_ids(&tree, tree.get_iterator(Envelope2D::new(2.5, 2.5, 2.6, 2.6), 0.));
        assert_eq!(ids, vec![7]);
        // Covering everything reports every reference.
        let ids = sorted_ids(&tree, tree.get_iterator(Envelope2D::new(0., 0., 4., 4.), 0.));
        assert_eq!(ids, vec![7, 7, 7, 7]);
    }

    #[test]
    fn remove_elements() {
        let mut tree = QuadTree::new(Envelope2D::new(0., 0., 10., 10.), 5);
        let a = tree.insert(1, Envelope2D::new(1., 1., 2., 2.), None);
        let b = tree.insert(2, Envelope2D::new(1.5, 1.5, 2.5, 2.5), Some(a));
        let quad = tree.get_quad(a);

        assert_eq!(tree.remove_element(a), 1);
        assert_eq!(tree.element_count(), 1);
        assert_eq!(tree.get_quad_element_count(quad), 0);
        let ids = sorted_ids(&tree, tree.get_iterator(Envelope2D::new(0., 0., 3., 3.), 0.));
        assert_eq!(ids, vec![2]);
        assert_eq!(tree.get_sub_tree_element_count(tree.get_root()), 1);
        tree.remove_element(b);
        assert_eq!(tree.get_sub_tree_element_count(tree.get_root()), 0);
        assert_eq!(tree.get_iterator(Envelope2D::new(0., 0., 10., 10.), 0.).next(), None);
    }

    #[test]
    fn serde_round_trip() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut tree = QuadTree::new(Envelope2D::new(0., 0., 105., 105.), 7);
        let handles: Vec<_> = random_boxes(&mut rng, 200)
            .into_iter()
            .enumerate()
            .map(|(id, b)| tree.insert(id * 3, b, None))
            .collect();
        for h in handles.iter().step_by(5) {
            tree.remove_element(*h);
        }
        tree.insert(1000, Envelope2D::empty(), None);

        let json = serde_json::to_string(&tree).unwrap();
        let restored: QuadTree = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.element_count(), tree.element_count());
        assert_eq!(restored.height(), tree.height());
        assert_eq!(restored.extent(), tree.extent());
        assert_eq!(restored.get_data_extent(), tree.get_data_extent());
        for h in tree.element_handles() {
            assert_eq!(restored.get_element(h), tree.get_element(h));
            assert_eq!(restored.get_quad(h), tree.get_quad(h));
            let (a, b) = (restored.get_element_extent(h), tree.get_element_extent(h));
            if b.is_empty() {
                assert!(a.is_empty());
            } else {
                assert_eq!(a, b, "element {}", h);
            }
        }
        assert!(restored.element_handles().eq(tree.element_handles()));
        for q in tree.quad_handles() {
            assert_eq!(restored.get_extent(q), tree.get_extent(q));
            assert_eq!(
                restored.get_sub_tree_element_count(q),
                tree.get_sub_tree_element_count(q)
            );
        }
        assert!(restored.quad_handles().eq(tree.quad_handles()));
    }
}
