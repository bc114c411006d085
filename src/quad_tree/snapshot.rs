//! Plain serializable form of a [`QuadTree`].
//!
//! Slab arenas are written out slot by slot (vacant slots as `None`) so
//! that every element and quad handle survives the round trip. Empty
//! envelopes are stored as `None` since their `NaN` bounds have no
//! portable encoding.
use serde_derive::{Deserialize, Serialize};
use slab::Slab;

use super::{Element, Quad, QuadTree};
use crate::envelope::Envelope2D;

#[derive(Debug, Serialize, Deserialize)]
struct ElementRecord {
    id: usize,
    extent: Option<Envelope2D>,
    quads: Vec<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct QuadTreeSnapshot {
    extent: Envelope2D,
    height: usize,
    store_duplicates: bool,
    root: usize,
    data_extent: Option<Envelope2D>,
    quads: Vec<Option<Quad>>,
    elements: Vec<Option<ElementRecord>>,
}

fn non_empty(env: Envelope2D) -> Option<Envelope2D> {
    if env.is_empty() {
        None
    } else {
        Some(env)
    }
}

fn to_slots<T, U, F: Fn(&T) -> U>(slab: &Slab<T>, f: F) -> Vec<Option<U>> {
    let len = slab.iter().map(|(key, _)| key + 1).max().unwrap_or(0);
    (0..len).map(|key| slab.get(key).map(&f)).collect()
}

/// Rebuild a slab with every value at its original key. Vacant slots are
/// filled with a placeholder and released afterwards.
fn from_slots<T, U, F: Fn(U) -> T, P: Fn() -> T>(slots: Vec<Option<U>>, f: F, placeholder: P) -> Slab<T> {
    let mut slab = Slab::with_capacity(slots.len());
    let mut vacant = Vec::new();
    for (index, slot) in slots.into_iter().enumerate() {
        let key = match slot {
            Some(value) => slab.insert(f(value)),
            None => {
                vacant.push(index);
                slab.insert(placeholder())
            }
        };
        debug_assert_eq!(key, index);
    }
    for key in vacant.into_iter().rev() {
        slab.remove(key);
    }
    slab
}

impl From<QuadTree> for QuadTreeSnapshot {
    fn from(tree: QuadTree) -> Self {
        QuadTreeSnapshot {
            extent: tree.extent,
            height: tree.height,
            store_duplicates: tree.store_duplicates,
            root: tree.root,
            data_extent: non_empty(tree.data_extent),
            quads: to_slots(&tree.quads, Quad::clone),
            elements: to_slots(&tree.elements, |e| ElementRecord {
                id: e.id,
                extent: non_empty(e.extent),
                quads: e.quads.clone(),
            }),
        }
    }
}

impl From<QuadTreeSnapshot> for QuadTree {
    fn from(snapshot: QuadTreeSnapshot) -> Self {
        QuadTree {
            extent: snapshot.extent,
            height: snapshot.height,
            store_duplicates: snapshot.store_duplicates,
            root: snapshot.root,
            data_extent: snapshot.data_extent.unwrap_or_else(Envelope2D::empty),
            quads: from_slots(snapshot.quads, |q| q, || Quad::new(Envelope2D::empty(), None, 0)),
            elements: from_slots(
                snapshot.elements,
                |e| Element {
                    id: e.id,
                    extent: e.extent.unwrap_or_else(Envelope2D::empty),
                    quads: e.quads,
                },
                || Element {
                    id: 0,
                    extent: Envelope2D::empty(),
                    quads: Vec::new(),
                },
            ),
        }
    }
}
