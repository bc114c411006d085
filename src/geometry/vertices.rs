use geo::Coordinate;
use smallvec::SmallVec;

use super::{Point, Semantics, VertexDescription};
use crate::{
    attribute_stream::{AttributeStreamOfDbl, AttributeStreamOfInt32},
    envelope::Envelope2D,
};

/// Storage of one non-position attribute.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AttributeData {
    Dbl(AttributeStreamOfDbl),
    Int32(AttributeStreamOfInt32),
}

impl AttributeData {
    fn new(semantics: Semantics, size: usize) -> Self {
        if semantics.is_integer() {
            AttributeData::Int32(AttributeStreamOfInt32::with_value(
                size,
                semantics.default_value() as i32,
            ))
        } else {
            AttributeData::Dbl(AttributeStreamOfDbl::with_value(
                size,
                semantics.default_value(),
            ))
        }
    }

    fn read(&self, index: usize) -> f64 {
        match self {
            AttributeData::Dbl(s) => s.read(index),
            AttributeData::Int32(s) => s.read(index) as f64,
        }
    }

    fn write(&mut self, index: usize, value: f64) {
        match self {
            AttributeData::Dbl(s) => s.write(index, value),
            AttributeData::Int32(s) => s.write(index, value.round() as i32),
        }
    }

    fn add(&mut self, value: f64) {
        match self {
            AttributeData::Dbl(s) => s.add(value),
            AttributeData::Int32(s) => s.add(value.round() as i32),
        }
    }
}

/// Vertex streams shared by multi-vertex geometries: interleaved `xy`
/// and one stream per extra attribute.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct VertexStreams {
    description: VertexDescription,
    xy: AttributeStreamOfDbl,
    attributes: SmallVec<[(Semantics, AttributeData); 3]>,
}

impl VertexStreams {
    pub(crate) fn new(description: VertexDescription) -> Self {
        let mut streams = VertexStreams {
            description: VertexDescription::xy(),
            xy: AttributeStreamOfDbl::new(0),
            attributes: SmallVec::new(),
        };
        for semantics in description.extra_attributes() {
            streams.add_attribute(semantics);
        }
        streams
    }

    #[inline]
    pub(crate) fn description(&self) -> VertexDescription {
        self.description
    }

    #[inline]
    pub(crate) fn point_count(&self) -> usize {
        self.xy.size() / 2
    }

    pub(crate) fn add_attribute(&mut self, semantics: Semantics) {
        if self.description.has_attribute(semantics) {
            return;
        }
        self.description.add_attribute(semantics);
        let count = self.point_count();
        self.attributes
            .push((semantics, AttributeData::new(semantics, count)));
        self.attributes.sort_by_key(|(s, _)| *s);
    }

    fn stream(&self, semantics: Semantics) -> Option<&AttributeData> {
        self.attributes
            .iter()
            .find(|(s, _)| *s == semantics)
            .map(|(_, d)| d)
    }

    fn stream_mut(&mut self, semantics: Semantics) -> Option<&mut AttributeData> {
        self.attributes
            .iter_mut()
            .find(|(s, _)| *s == semantics)
            .map(|(_, d)| d)
    }

    pub(crate) fn push(&mut self, point: &Point) {
        for semantics in point.description().extra_attributes() {
            self.add_attribute(semantics);
        }
        self.xy.add(point.x());
        self.xy.add(point.y());
        for (semantics, data) in self.attributes.iter_mut() {
            data.add(point.attribute(*semantics, 0));
        }
    }

    #[inline]
    pub(crate) fn get_xy(&self, index: usize) -> Coordinate<f64> {
        Coordinate {
            x: self.xy.read(2 * index),
            y: self.xy.read(2 * index + 1),
        }
    }

    pub(crate) fn set_xy(&mut self, index: usize, xy: Coordinate<f64>) {
        self.xy.write(2 * index, xy.x);
        self.xy.write(2 * index + 1, xy.y);
    }

    pub(crate) fn get_attribute_as_dbl(&self, semantics: Semantics, index: usize, ordinate: usize) -> f64 {
        match semantics {
            Semantics::Position => self.xy.read(2 * index + ordinate.min(1)),
            _ => self
                .stream(semantics)
                .map_or_else(|| semantics.default_value(), |d| d.read(index)),
        }
    }

    pub(crate) fn set_attribute(&mut self, semantics: Semantics, index: usize, ordinate: usize, value: f64) {
        match semantics {
            Semantics::Position => self.xy.write(2 * index + ordinate.min(1), value),
            _ => {
                self.add_attribute(semantics);
                self.stream_mut(semantics)
                    .expect("attribute stream was just added")
                    .write(index, value);
            }
        }
    }

    pub(crate) fn get_point(&self, index: usize) -> Point {
        let xy = self.get_xy(index);
        let mut point = Point::new(xy.x, xy.y);
        for (semantics, data) in self.attributes.iter() {
            point.set_attribute(*semantics, 0, data.read(index));
        }
        point
    }

    pub(crate) fn envelope(&self) -> Envelope2D {
        let mut env = Envelope2D::empty();
        for i in 0..self.point_count() {
            env.merge_point(self.get_xy(i));
        }
        env
    }
}
