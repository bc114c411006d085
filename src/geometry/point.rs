use geo::Coordinate;

use super::{Semantics, VertexDescription};

/// A single vertex with optional `z`, `m` and `id` attributes.
#[derive(Debug, Clone, Copy)]
pub struct Point {
    description: VertexDescription,
    xy: Coordinate<f64>,
    z: f64,
    m: f64,
    id: i32,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point {
            description: VertexDescription::xy(),
            xy: Coordinate { x, y },
            z: Semantics::Z.default_value(),
            m: Semantics::M.default_value(),
            id: 0,
        }
    }

    /// A point without coordinates.
    pub fn empty() -> Self {
        Point::new(f64::NAN, f64::NAN)
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.set_attribute(Semantics::Z, 0, z);
        self
    }

    pub fn with_m(mut self, m: f64) -> Self {
        self.set_attribute(Semantics::M, 0, m);
        self
    }

    pub fn with_id(mut self, id: i32) -> Self {
        self.set_attribute(Semantics::Id, 0, id as f64);
        self
    }

    #[inline]
    pub fn xy(&self) -> Coordinate<f64> {
        self.xy
    }

    pub fn set_xy(&mut self, xy: Coordinate<f64>) {
        self.xy = xy;
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.xy.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.xy.y
    }

    pub fn description(&self) -> VertexDescription {
        self.description
    }

    pub fn is_empty(&self) -> bool {
        self.xy.x.is_nan() || self.xy.y.is_nan()
    }

    /// Read an attribute ordinate; absent attributes read as their default.
    pub fn attribute(&self, semantics: Semantics, ordinate: usize) -> f64 {
        match semantics {
            Semantics::Position => {
                if ordinate == 0 {
                    self.xy.x
                } else {
                    self.xy.y
                }
            }
            Semantics::Z => self.z,
            Semantics::M => self.m,
            Semantics::Id => self.id as f64,
        }
    }

    /// Write an attribute ordinate, adding the attribute to the description.
    pub fn set_attribute(&mut self, semantics: Semantics, ordinate: usize, value: f64) {
        self.description.add_attribute(semantics);
        match semantics {
            Semantics::Position => {
                if ordinate == 0 {
                    self.xy.x = value;
                } else {
                    self.xy.y = value;
                }
            }
            Semantics::Z => self.z = value,
            Semantics::M => self.m = value,
            Semantics::Id => self.id = value.round() as i32,
        }
    }
}

fn same(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// Structural equality over the attributes in the description.
impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.description == other.description
            && self
                .description
                .attributes()
                .all(|s| (0..s.components()).all(|o| same(self.attribute(s, o), other.attribute(s, o))))
    }
}

impl From<Coordinate<f64>> for Point {
    fn from(xy: Coordinate<f64>) -> Self {
        Point::new(xy.x, xy.y)
    }
}

impl From<geo::Point<f64>> for Point {
    fn from(pt: geo::Point<f64>) -> Self {
        pt.0.into()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}
