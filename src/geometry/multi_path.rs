use geo::{Coordinate, Line};
use itertools::Itertools;
use smallvec::SmallVec;

use super::{vertices::VertexStreams, Point, Semantics, VertexDescription};
use crate::{
    attribute_stream::{AttributeStreamOfInt32, AttributeStreamOfInt8},
    envelope::Envelope2D,
    error::{GeometryError, Result},
};

const PATH_CLOSED: i8 = 1;

/// Whether the paths of a [`MultiPath`] are chains or rings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Polyline,
    Polygon,
}

/// A sequence of paths over shared vertex streams.
///
/// Path `p` covers the vertices `path_start(p)..path_end(p)`. Polygon
/// paths are always closed and never store the closing vertex; polyline
/// paths are open unless closed explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiPath {
    kind: PathKind,
    vertices: VertexStreams,
    path_starts: AttributeStreamOfInt32,
    path_flags: AttributeStreamOfInt8,
}

impl MultiPath {
    pub fn new(kind: PathKind, description: VertexDescription) -> Self {
        MultiPath {
            kind,
            vertices: VertexStreams::new(description),
            path_starts: AttributeStreamOfInt32::with_value(1, 0),
            path_flags: AttributeStreamOfInt8::new(0),
        }
    }

    pub fn polyline() -> Self {
        MultiPath::new(PathKind::Polyline, VertexDescription::xy())
    }

    pub fn polygon() -> Self {
        MultiPath::new(PathKind::Polygon, VertexDescription::xy())
    }

    #[inline]
    pub fn kind(&self) -> PathKind {
        self.kind
    }

    #[inline]
    pub fn is_polygon(&self) -> bool {
        self.kind == PathKind::Polygon
    }

    pub fn description(&self) -> VertexDescription {
        self.vertices.description()
    }

    pub fn add_attribute(&mut self, semantics: Semantics) {
        self.vertices.add_attribute(semantics);
    }

    /// Begin a new path at `point`.
    pub fn start_path(&mut self, point: &Point) {
        let flags = if self.is_polygon() { PATH_CLOSED } else { 0 };
        self.path_flags.add(flags);
        self.vertices.push(point);
        self.path_starts.add(self.vertices.point_count() as i32);
    }

    pub fn start_path_xy(&mut self, x: f64, y: f64) {
        self.start_path(&Point::new(x, y));
    }

    /// Extend the last path to `point`.
    pub fn line_to(&mut self, point: &Point) {
        assert!(self.path_count() > 0, "line_to requires a started path");
        self.vertices.push(point);
        let last = self.path_starts.size() - 1;
        self.path_starts
            .write(last, self.vertices.point_count() as i32);
    }

    pub fn line_to_xy(&mut self, x: f64, y: f64) {
        self.line_to(&Point::new(x, y));
    }

    /// Mark the last path closed (without duplicating its start vertex).
    pub fn close_path(&mut self) {
        assert!(self.path_count() > 0, "close_path requires a started path");
        let last = self.path_count() - 1;
        self.set_closed_path(last, true);
    }

    pub fn set_closed_path(&mut self, path: usize, closed: bool) {
        if self.is_polygon() {
            return;
        }
        let flags = self.path_flags.read(path);
        let flags = if closed {
            flags | PATH_CLOSED
        } else {
            flags & !PATH_CLOSED
        };
        self.path_flags.write(path, flags);
    }

    /// Add a path made of `points`.
    pub fn add_path<'a, I: IntoIterator<Item = &'a Point>>(&mut self, points: I, closed: bool) {
        let mut points = points.into_iter();
        let first = match points.next() {
            Some(pt) => pt,
            None => return,
        };
        self.start_path(first);
        for pt in points {
            self.line_to(pt);
        }
        if closed {
            self.close_path();
        }
    }

    pub fn path_count(&self) -> usize {
        self.path_flags.size()
    }

    #[inline]
    pub fn path_start(&self, path: usize) -> usize {
        self.path_starts.read(path) as usize
    }

    #[inline]
    pub fn path_end(&self, path: usize) -> usize {
        self.path_starts.read(path + 1) as usize
    }

    #[inline]
    pub fn path_size(&self, path: usize) -> usize {
        self.path_end(path) - self.path_start(path)
    }

    #[inline]
    pub fn is_closed_path(&self, path: usize) -> bool {
        self.path_flags.read(path) & PATH_CLOSED != 0
    }

    pub fn point_count(&self) -> usize {
        self.vertices.point_count()
    }

    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }

    pub fn get_xy(&self, index: usize) -> Coordinate<f64> {
        self.vertices.get_xy(index)
    }

    pub fn set_xy(&mut self, index: usize, xy: Coordinate<f64>) {
        self.vertices.set_xy(index, xy);
    }

    pub fn get_point(&self, index: usize) -> Point {
        self.vertices.get_point(index)
    }

    pub fn get_attribute_as_dbl(&self, semantics: Semantics, index: usize, ordinate: usize) -> f64 {
        self.vertices.get_attribute_as_dbl(semantics, index, ordinate)
    }

    pub fn set_attribute(&mut self, semantics: Semantics, index: usize, ordinate: usize, value: f64) {
        self.vertices.set_attribute(semantics, index, ordinate, value);
    }

    /// Number of segments of a path; a closed path has a closing segment.
    pub fn path_segment_count(&self, path: usize) -> usize {
        let size = self.path_size(path);
        if size < 2 {
            0
        } else if self.is_closed_path(path) {
            size
        } else {
            size - 1
        }
    }

    pub fn segment_count(&self) -> usize {
        (0..self.path_count())
            .map(|p| self.path_segment_count(p))
            .sum()
    }

    /// Iterate `(start vertex index, segment)` across all paths.
    pub fn segments(&self) -> impl Iterator<Item = (usize, Line<f64>)> + '_ {
        (0..self.path_count()).flat_map(move |path| {
            let start = self.path_start(path);
            let size = self.path_size(path);
            (0..self.path_segment_count(path)).map(move |k| {
                let from = start + k;
                let to = start + (k + 1) % size;
                (from, Line::new(self.get_xy(from), self.get_xy(to)))
            })
        })
    }

    pub fn envelope(&self) -> Envelope2D {
        self.vertices.envelope()
    }

    pub fn calculate_length_2d(&self) -> f64 {
        self.segments().map(|(_, line)| segment_length(&line)).sum()
    }

    /// Interpolate an attribute on the vertices strictly between
    /// `from_point` and `to_point` of `path` (indices relative to the path).
    ///
    /// Values are linear in the 2D distance travelled along the path. When
    /// either end value is `NaN`, the interior vertices become `NaN`. On a
    /// closed path `from_point > to_point` walks across the path start.
    pub fn interpolate_attributes(
        &mut self,
        semantics: Semantics,
        ordinate: usize,
        path: usize,
        from_point: usize,
        to_point: usize,
    ) -> Result<()> {
        if semantics == Semantics::Position {
            return Err(GeometryError::invalid_argument(
                "cannot interpolate vertex positions",
            ));
        }
        if path >= self.path_count() {
            return Err(GeometryError::invalid_argument(format!(
                "path {path} out of range"
            )));
        }
        let size = self.path_size(path);
        if from_point >= size || to_point >= size {
            return Err(GeometryError::invalid_argument(format!(
                "points {from_point}..{to_point} out of range for path of {size} points"
            )));
        }
        if from_point > to_point && !self.is_closed_path(path) {
            return Err(GeometryError::invalid_argument(
                "reverse interpolation range requires a closed path",
            ));
        }

        let start = self.path_start(path);
        let steps = if from_point <= to_point {
            to_point - from_point
        } else {
            size - from_point + to_point
        };
        let indices: SmallVec<[usize; 16]> = (0..=steps)
            .map(|k| start + (from_point + k) % size)
            .collect();
        if indices.len() < 3 {
            return Ok(());
        }

        let cumulative: SmallVec<[f64; 16]> = std::iter::once(0.)
            .chain(indices.iter().tuple_windows().scan(0., |acc, (&a, &b)| {
                *acc += distance(self.get_xy(a), self.get_xy(b));
                Some(*acc)
            }))
            .collect();
        let total = cumulative[cumulative.len() - 1];
        let v0 = self.get_attribute_as_dbl(semantics, indices[0], ordinate);
        let v1 = self.get_attribute_as_dbl(semantics, indices[steps], ordinate);

        for k in 1..steps {
            let value = if v0.is_nan() || v1.is_nan() {
                f64::NAN
            } else if total == 0. {
                v0
            } else {
                v0 + (v1 - v0) * (cumulative[k] / total)
            };
            self.set_attribute(semantics, indices[k], ordinate, value);
        }
        Ok(())
    }
}

#[inline]
pub(crate) fn distance(a: Coordinate<f64>, b: Coordinate<f64>) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

#[inline]
fn segment_length(line: &Line<f64>) -> f64 {
    distance(line.start, line.end)
}

/// A polyline path; the coordinates are kept as given.
impl From<&geo::LineString<f64>> for MultiPath {
    fn from(ls: &geo::LineString<f64>) -> Self {
        let mut out = MultiPath::polyline();
        let points: Vec<Point> = ls.0.iter().map(|c| Point::from(*c)).collect();
        out.add_path(points.iter(), false);
        out
    }
}

impl From<&geo::MultiLineString<f64>> for MultiPath {
    fn from(mls: &geo::MultiLineString<f64>) -> Self {
        let mut out = MultiPath::polyline();
        for ls in mls.0.iter() {
            let points: Vec<Point> = ls.0.iter().map(|c| Point::from(*c)).collect();
            out.add_path(points.iter(), false);
        }
        out
    }
}

impl MultiPath {
    fn add_ring(&mut self, ring: &geo::LineString<f64>) {
        let coords = &ring.0;
        let n = if coords.len() > 1 && coords.first() == coords.last() {
            coords.len() - 1
        } else {
            coords.len()
        };
        let points: Vec<Point> = coords[..n].iter().map(|c| Point::from(*c)).collect();
        self.add_path(points.iter(), true);
    }
}

/// Exterior ring first, then the interiors; closing duplicates dropped.
impl From<&geo::Polygon<f64>> for MultiPath {
    fn from(poly: &geo::Polygon<f64>) -> Self {
        let mut out = MultiPath::polygon();
        out.add_ring(poly.exterior());
        for hole in poly.interiors() {
            out.add_ring(hole);
        }
        out
    }
}

impl From<&geo::MultiPolygon<f64>> for MultiPath {
    fn from(mp: &geo::MultiPolygon<f64>) -> Self {
        let mut out = MultiPath::polygon();
        for poly in mp.0.iter() {
            out.add_ring(poly.exterior());
            for hole in poly.interiors() {
                out.add_ring(hole);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geo::Polygon;
    use wkt::TryFromWkt;

    use super::*;

    fn polyline_with_m(points: &[(f64, f64, f64)]) -> MultiPath {
        let mut mp = MultiPath::new(PathKind::Polyline, VertexDescription::xy().with(Semantics::M));
        let points: Vec<Point> = points
            .iter()
            .map(|&(x, y, m)| Point::new(x, y).with_m(m))
            .collect();
        mp.add_path(points.iter(), false);
        mp
    }

    #[test]
    fn polygon_from_wkt() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let poly = Polygon::<f64>::try_from_wkt_str(
            "POLYGON((0 0,10 0,10 10,0 10,0 0),(2 2,2 4,4 4,4 2,2 2))",
        )?;
        let mp = MultiPath::from(&poly);
        assert_eq!(mp.path_count(), 2);
        assert_eq!(mp.point_count(), 8);
        assert!(mp.is_closed_path(1));
        assert_eq!(mp.segment_count(), 8);
        assert_eq!(mp.envelope(), Envelope2D::new(0., 0., 10., 10.));
        assert_relative_eq!(mp.calculate_length_2d(), 48.);
        Ok(())
    }

    #[test]
    fn polyline_segments() {
        let mut mp = MultiPath::polyline();
        mp.start_path_xy(0., 0.);
        mp.line_to_xy(1., 0.);
        mp.line_to_xy(1., 1.);
        mp.start_path_xy(5., 5.);
        mp.line_to_xy(6., 5.);
        assert_eq!(mp.path_size(0), 3);
        assert_eq!(mp.path_start(1), 3);
        assert!(!mp.is_closed_path(0));
        assert_eq!(mp.segment_count(), 3);

        mp.set_closed_path(0, true);
        let starts: Vec<_> = mp.segments().map(|(i, _)| i).collect();
        assert_eq!(starts, vec![0, 1, 2, 3]);
    }

    #[test]
    fn interpolate_by_length() {
        let mut mp = polyline_with_m(&[
            (0., 0., 10.),
            (1., 0., f64::NAN),
            (3., 0., f64::NAN),
            (4., 0., 50.),
        ]);
        mp.interpolate_attributes(Semantics::M, 0, 0, 0, 3).unwrap();
        assert_relative_eq!(mp.get_attribute_as_dbl(Semantics::M, 1, 0), 20.);
        assert_relative_eq!(mp.get_attribute_as_dbl(Semantics::M, 2, 0), 40.);
        assert_relative_eq!(mp.get_attribute_as_dbl(Semantics::M, 3, 0), 50.);
    }

    #[test]
    fn interpolate_from_nan() {
        let mut mp = polyline_with_m(&[
            (0., 0., f64::NAN),
            (1., 0., 3.),
            (2., 0., 5.),
            (3., 0., 7.),
        ]);
        mp.interpolate_attributes(Semantics::M, 0, 0, 0, 2).unwrap();
        assert!(mp.get_attribute_as_dbl(Semantics::M, 1, 0).is_nan());
        assert_eq!(mp.get_attribute_as_dbl(Semantics::M, 2, 0), 5.);

        // Adjacent points leave everything untouched.
        mp.interpolate_attributes(Semantics::M, 0, 0, 2, 3).unwrap();
        assert_eq!(mp.get_attribute_as_dbl(Semantics::M, 3, 0), 7.);
    }

    #[test]
    fn interpolate_across_ring_start() {
        let mut mp = MultiPath::polygon();
        let pts: Vec<Point> = [(0., 0., 0.), (2., 0., 99.), (2., 2., 4.), (0., 2., 99.)]
            .iter()
            .map(|&(x, y, m)| Point::new(x, y).with_m(m))
            .collect();
        mp.add_path(pts.iter(), true);
        mp.interpolate_attributes(Semantics::M, 0, 0, 2, 0).unwrap();
        assert_relative_eq!(mp.get_attribute_as_dbl(Semantics::M, 3, 0), 2.);
        assert_eq!(mp.get_attribute_as_dbl(Semantics::M, 1, 0), 99.);

        assert!(mp
            .interpolate_attributes(Semantics::M, 0, 0, 0, 9)
            .is_err());
    }

    #[test]
    fn interpolate_rejects_open_wrap() {
        let mut mp = polyline_with_m(&[(0., 0., 1.), (1., 0., 2.), (2., 0., 3.)]);
        assert!(mp.interpolate_attributes(Semantics::M, 0, 0, 2, 0).is_err());
        assert!(mp.interpolate_attributes(Semantics::Position, 0, 0, 0, 2).is_err());
    }
}
