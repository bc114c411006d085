//! Geometry value types exchanged with the topology structures.
//!
//! [`Geometry`] is what an [`EditShape`](crate::EditShape) ingests and
//! reconstructs. The multi-vertex types store their vertices in
//! [`AttributeStream`](crate::AttributeStream)s and convert from the
//! corresponding `geo` types.
use std::convert::TryFrom;

mod description;
pub use description::{Semantics, VertexDescription};

mod point;
pub use point::Point;

mod vertices;

mod multi_point;
pub use multi_point::MultiPoint;

mod multi_path;
pub(crate) use multi_path::distance;
pub use multi_path::{MultiPath, PathKind};

use crate::{envelope::Envelope2D, error::GeometryError};

/// Kind of a [`Geometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    Point,
    MultiPoint,
    Polyline,
    Polygon,
}

impl GeometryType {
    pub fn name(self) -> &'static str {
        match self {
            GeometryType::Point => "point",
            GeometryType::MultiPoint => "multipoint",
            GeometryType::Polyline => "polyline",
            GeometryType::Polygon => "polygon",
        }
    }

    /// Whether vertices of this kind are connected by segments.
    pub fn is_multi_path(self) -> bool {
        matches!(self, GeometryType::Polyline | GeometryType::Polygon)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    MultiPoint(MultiPoint),
    Polyline(MultiPath),
    Polygon(MultiPath),
}

impl Geometry {
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point(_) => GeometryType::Point,
            Geometry::MultiPoint(_) => GeometryType::MultiPoint,
            Geometry::Polyline(_) => GeometryType::Polyline,
            Geometry::Polygon(_) => GeometryType::Polygon,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point(p) => p.is_empty(),
            Geometry::MultiPoint(mp) => mp.is_empty(),
            Geometry::Polyline(mp) | Geometry::Polygon(mp) => mp.is_empty(),
        }
    }

    pub fn description(&self) -> VertexDescription {
        match self {
            Geometry::Point(p) => p.description(),
            Geometry::MultiPoint(mp) => mp.description(),
            Geometry::Polyline(mp) | Geometry::Polygon(mp) => mp.description(),
        }
    }

    pub fn envelope(&self) -> Envelope2D {
        match self {
            Geometry::Point(p) if !p.is_empty() => Envelope2D::from_point(p.xy()),
            Geometry::Point(_) => Envelope2D::empty(),
            Geometry::MultiPoint(mp) => mp.envelope(),
            Geometry::Polyline(mp) | Geometry::Polygon(mp) => mp.envelope(),
        }
    }
}

impl From<Point> for Geometry {
    fn from(p: Point) -> Self {
        Geometry::Point(p)
    }
}

impl From<MultiPoint> for Geometry {
    fn from(mp: MultiPoint) -> Self {
        Geometry::MultiPoint(mp)
    }
}

/// Wrap by the path kind.
impl From<MultiPath> for Geometry {
    fn from(mp: MultiPath) -> Self {
        match mp.kind() {
            PathKind::Polyline => Geometry::Polyline(mp),
            PathKind::Polygon => Geometry::Polygon(mp),
        }
    }
}

fn mismatch(expected: GeometryType, found: &Geometry) -> GeometryError {
    GeometryError::GeometryMismatch {
        expected: expected.name(),
        found: found.geometry_type().name(),
    }
}

impl TryFrom<Geometry> for Point {
    type Error = GeometryError;

    fn try_from(geom: Geometry) -> Result<Self, Self::Error> {
        match geom {
            Geometry::Point(p) => Ok(p),
            other => Err(mismatch(GeometryType::Point, &other)),
        }
    }
}

impl TryFrom<Geometry> for MultiPoint {
    type Error = GeometryError;

    fn try_from(geom: Geometry) -> Result<Self, Self::Error> {
        match geom {
            Geometry::MultiPoint(mp) => Ok(mp),
            other => Err(mismatch(GeometryType::MultiPoint, &other)),
        }
    }
}

/// Accepts both polylines and polygons.
impl TryFrom<Geometry> for MultiPath {
    type Error = GeometryError;

    fn try_from(geom: Geometry) -> Result<Self, Self::Error> {
        match geom {
            Geometry::Polyline(mp) | Geometry::Polygon(mp) => Ok(mp),
            other => Err(mismatch(GeometryType::Polyline, &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        let geom: Geometry = MultiPath::polygon().into();
        assert_eq!(geom.geometry_type(), GeometryType::Polygon);
        assert!(geom.is_empty());
        assert!(geom.envelope().is_empty());

        let err = Point::try_from(geom.clone()).unwrap_err();
        assert_eq!(
            err,
            GeometryError::GeometryMismatch {
                expected: "point",
                found: "polygon"
            }
        );
        assert!(MultiPath::try_from(geom).is_ok());

        let pt: Geometry = Point::new(1., 2.).with_z(3.).into();
        assert!(pt.description().has_attribute(Semantics::Z));
        assert_eq!(pt.envelope(), Envelope2D::new(1., 2., 1., 2.));
    }
}
