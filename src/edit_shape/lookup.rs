use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use geo::Coordinate;

use super::EditShape;
use crate::index_hash_table::{HashFunction, IndexHashTable};

/// Hashes edit-shape vertices by their exact coordinates.
#[derive(Debug, Clone, Copy)]
pub struct VertexHash<'a> {
    shape: &'a EditShape,
}

fn coordinate_hash(xy: Coordinate<f64>) -> u64 {
    let mut hasher = DefaultHasher::new();
    // Adding zero maps -0.0 onto 0.0, which compares equal.
    (xy.x + 0.).to_bits().hash(&mut hasher);
    (xy.y + 0.).to_bits().hash(&mut hasher);
    hasher.finish()
}

impl<'a> HashFunction for VertexHash<'a> {
    type Descriptor = Coordinate<f64>;

    fn get_hash(&self, element: usize) -> u64 {
        coordinate_hash(self.shape.get_xy(element))
    }

    fn equal(&self, element_1: usize, element_2: usize) -> bool {
        self.shape.get_xy(element_1) == self.shape.get_xy(element_2)
    }

    fn get_descriptor_hash(&self, descriptor: &Coordinate<f64>) -> u64 {
        coordinate_hash(*descriptor)
    }

    fn equal_descriptor(&self, descriptor: &Coordinate<f64>, element: usize) -> bool {
        *descriptor == self.shape.get_xy(element)
    }
}

impl EditShape {
    /// Table of every vertex keyed by its coordinates. Coincident vertices
    /// are chained through [`IndexHashTable::get_next_node`]; a coordinate
    /// can be looked up before any vertex holds it with
    /// [`IndexHashTable::find_node_by_descriptor`].
    pub fn vertex_lookup(&self) -> IndexHashTable<VertexHash<'_>> {
        let mut table = IndexHashTable::new(self.get_total_point_count(), VertexHash { shape: self });
        for geometry in self.geometry_handles() {
            for path in self.path_handles(geometry) {
                for vertex in self.path_vertices(path) {
                    table.add_element(vertex);
                }
            }
        }
        table
    }
}
