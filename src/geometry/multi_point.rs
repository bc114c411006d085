use geo::Coordinate;

use super::{vertices::VertexStreams, Point, Semantics, VertexDescription};
use crate::envelope::Envelope2D;

/// An unordered collection of vertices, with no segments between them.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiPoint {
    vertices: VertexStreams,
}

impl Default for MultiPoint {
    fn default() -> Self {
        MultiPoint::new(VertexDescription::xy())
    }
}

impl MultiPoint {
    pub fn new(description: VertexDescription) -> Self {
        MultiPoint {
            vertices: VertexStreams::new(description),
        }
    }

    pub fn add(&mut self, point: &Point) {
        self.vertices.push(point);
    }

    pub fn add_xy(&mut self, x: f64, y: f64) {
        self.vertices.push(&Point::new(x, y));
    }

    pub fn add_attribute(&mut self, semantics: Semantics) {
        self.vertices.add_attribute(semantics);
    }

    pub fn description(&self) -> VertexDescription {
        self.vertices.description()
    }

    pub fn point_count(&self) -> usize {
        self.vertices.point_count()
    }

    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }

    pub fn get_point(&self, index: usize) -> Point {
        self.vertices.get_point(index)
    }

    pub fn get_xy(&self, index: usize) -> Coordinate<f64> {
        self.vertices.get_xy(index)
    }

    pub fn get_attribute_as_dbl(&self, semantics: Semantics, index: usize, ordinate: usize) -> f64 {
        self.vertices.get_attribute_as_dbl(semantics, index, ordinate)
    }

    pub fn set_attribute(&mut self, semantics: Semantics, index: usize, ordinate: usize, value: f64) {
        self.vertices.set_attribute(semantics, index, ordinate, value);
    }

    pub fn envelope(&self) -> Envelope2D {
        self.vertices.envelope()
    }
}

impl From<&geo::MultiPoint<f64>> for MultiPoint {
    fn from(mp: &geo::MultiPoint<f64>) -> Self {
        let mut out = MultiPoint::default();
        for pt in mp.0.iter() {
            out.add_xy(pt.x(), pt.y());
        }
        out
    }
}
