use geo::Line;
use log::trace;
use smallvec::SmallVec;

use super::EditShape;
use crate::{
    envelope::Envelope2D,
    error::{GeometryError, Result},
    geometry::{Point, Semantics},
};

impl EditShape {
    /// Segment starting at `vertex`, if the vertex has a successor on a
    /// polyline or polygon path.
    pub fn get_segment(&self, vertex: usize) -> Option<Line<f64>> {
        let geometry = self.get_geometry_from_vertex(vertex);
        if !self.get_geometry_type(geometry).is_multi_path() {
            return None;
        }
        let next = self.get_next_vertex(vertex)?;
        Some(Line::new(self.get_xy(vertex), self.get_xy(next)))
    }

    pub fn get_segment_envelope(&self, vertex: usize) -> Option<Envelope2D> {
        self.get_segment(vertex).map(Envelope2D::from)
    }

    /// Insert one vertex per parameter on the segment starting at `vertex`.
    ///
    /// Parameters must increase strictly inside `(0, 1)`. Position and
    /// every attribute of the new vertices are interpolated linearly
    /// between the segment ends. Splitting the closing segment of a closed
    /// path places the new vertices at the start of the path.
    pub fn split_segment(&mut self, vertex: usize, t: &[f64]) -> Result<()> {
        let geometry = self.get_geometry_from_vertex(vertex);
        if !self.get_geometry_type(geometry).is_multi_path() {
            return Err(GeometryError::invalid_argument(format!(
                "vertex {} is not on a polyline or polygon",
                vertex
            )));
        }
        let next = self.get_next_vertex(vertex).ok_or_else(|| {
            GeometryError::invalid_argument(format!("vertex {} does not start a segment", vertex))
        })?;
        let mut last = 0.;
        for &ti in t {
            if !(ti > last && ti < 1.) {
                return Err(GeometryError::invalid_argument(format!(
                    "split parameters must increase strictly inside (0, 1), got {:?}",
                    t
                )));
            }
            last = ti;
        }

        let path = self.get_path_from_vertex(vertex);
        let description = self.get_geometry_description(geometry);
        let start = self.get_xy(vertex);
        let end = self.get_xy(next);
        let extra: SmallVec<[Semantics; 3]> = description.extra_attributes().collect();
        for &ti in t {
            let lerp = |a: f64, b: f64| a + (b - a) * ti;
            let inserted = self.insert_vertex(
                path,
                Some(next),
                &Point::new(lerp(start.x, end.x), lerp(start.y, end.y)),
            );
            for &semantics in extra.iter() {
                let value = lerp(
                    self.get_attribute_as_dbl(semantics, vertex, 0),
                    self.get_attribute_as_dbl(semantics, next, 0),
                );
                self.set_attribute(semantics, inserted, 0, value);
            }
        }
        trace!("edit shape: split segment at {} into {} pieces", vertex, t.len() + 1);
        Ok(())
    }
}
