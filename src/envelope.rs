//! Axis aligned intervals and boxes.
use geo::{Coordinate, Line, Rect};
use serde_derive::{Deserialize, Serialize};

/// A closed interval `[vmin, vmax]`.
///
/// An interval with `vmin > vmax` (or `NaN` bounds) is empty; the empty
/// interval intersects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope1D {
    pub vmin: f64,
    pub vmax: f64,
}

impl Envelope1D {
    /// Create from two bounds in any order.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Envelope1D { vmin: a, vmax: b }
        } else {
            Envelope1D { vmin: b, vmax: a }
        }
    }

    pub fn empty() -> Self {
        Envelope1D {
            vmin: f64::NAN,
            vmax: f64::NAN,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.vmin <= self.vmax)
    }

    pub fn length(&self) -> f64 {
        if self.is_empty() {
            0.
        } else {
            self.vmax - self.vmin
        }
    }

    pub fn merge(&mut self, value: f64) {
        if self.is_empty() {
            self.vmin = value;
            self.vmax = value;
        } else {
            self.vmin = self.vmin.min(value);
            self.vmax = self.vmax.max(value);
        }
    }

    /// Grow by `delta` on both sides.
    pub fn inflate(&self, delta: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        Envelope1D {
            vmin: self.vmin - delta,
            vmax: self.vmax + delta,
        }
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        self.vmin <= value && value <= self.vmax
    }

    #[inline]
    pub fn is_intersecting(&self, other: &Envelope1D) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.vmin <= other.vmax
            && other.vmin <= self.vmax
    }
}

/// A degenerate interval for point queries.
impl From<f64> for Envelope1D {
    fn from(value: f64) -> Self {
        Envelope1D {
            vmin: value,
            vmax: value,
        }
    }
}

impl From<(f64, f64)> for Envelope1D {
    fn from((a, b): (f64, f64)) -> Self {
        Envelope1D::new(a, b)
    }
}

/// An axis aligned box `[xmin, xmax] x [ymin, ymax]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope2D {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Envelope2D {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Envelope2D {
            xmin: xmin.min(xmax),
            ymin: ymin.min(ymax),
            xmax: xmin.max(xmax),
            ymax: ymin.max(ymax),
        }
    }

    pub fn empty() -> Self {
        Envelope2D {
            xmin: f64::NAN,
            ymin: f64::NAN,
            xmax: f64::NAN,
            ymax: f64::NAN,
        }
    }

    pub fn from_point(pt: Coordinate<f64>) -> Self {
        Envelope2D {
            xmin: pt.x,
            ymin: pt.y,
            xmax: pt.x,
            ymax: pt.y,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.xmin <= self.xmax && self.ymin <= self.ymax)
    }

    pub fn merge_point(&mut self, pt: Coordinate<f64>) {
        if self.is_empty() {
            *self = Envelope2D::from_point(pt);
        } else {
            self.xmin = self.xmin.min(pt.x);
            self.ymin = self.ymin.min(pt.y);
            self.xmax = self.xmax.max(pt.x);
            self.ymax = self.ymax.max(pt.y);
        }
    }

    pub fn merge(&mut self, other: &Envelope2D) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
            return;
        }
        self.xmin = self.xmin.min(other.xmin);
        self.ymin = self.ymin.min(other.ymin);
        self.xmax = self.xmax.max(other.xmax);
        self.ymax = self.ymax.max(other.ymax);
    }

    /// Return a copy grown by `dx` horizontally and `dy` vertically on
    /// each side.
    pub fn inflate(&self, dx: f64, dy: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        Envelope2D {
            xmin: self.xmin - dx,
            ymin: self.ymin - dy,
            xmax: self.xmax + dx,
            ymax: self.ymax + dy,
        }
    }

    #[inline]
    pub fn is_intersecting(&self, other: &Envelope2D) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.xmin <= other.xmax
            && other.xmin <= self.xmax
            && self.ymin <= other.ymax
            && other.ymin <= self.ymax
    }

    /// Whether `other` lies inside this box (boundary included).
    #[inline]
    pub fn contains(&self, other: &Envelope2D) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.xmin <= other.xmin
            && other.xmax <= self.xmax
            && self.ymin <= other.ymin
            && other.ymax <= self.ymax
    }

    #[inline]
    pub fn contains_point(&self, pt: Coordinate<f64>) -> bool {
        self.xmin <= pt.x && pt.x <= self.xmax && self.ymin <= pt.y && pt.y <= self.ymax
    }

    pub fn center(&self) -> Coordinate<f64> {
        Coordinate {
            x: 0.5 * (self.xmin + self.xmax),
            y: 0.5 * (self.ymin + self.ymax),
        }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn x_interval(&self) -> Envelope1D {
        Envelope1D {
            vmin: self.xmin,
            vmax: self.xmax,
        }
    }

    pub fn y_interval(&self) -> Envelope1D {
        Envelope1D {
            vmin: self.ymin,
            vmax: self.ymax,
        }
    }

    /// Check if the segment `line` touches this box after growing it by
    /// `tolerance`.
    ///
    /// Clips the segment parametrically against the four slabs of the box
    /// (Liang-Barsky).
    pub fn is_intersecting_line(&self, line: &Line<f64>, tolerance: f64) -> bool {
        if self.is_empty() {
            return false;
        }
        let env = self.inflate(tolerance, tolerance);
        let d = line.delta();
        let mut t0 = 0.;
        let mut t1 = 1.;
        let checks = [
            (-d.x, line.start.x - env.xmin),
            (d.x, env.xmax - line.start.x),
            (-d.y, line.start.y - env.ymin),
            (d.y, env.ymax - line.start.y),
        ];
        for &(p, q) in checks.iter() {
            if p == 0. {
                if q < 0. {
                    return false;
                }
            } else {
                let r = q / p;
                if p < 0. {
                    if r > t1 {
                        return false;
                    }
                    if r > t0 {
                        t0 = r;
                    }
                } else {
                    if r < t0 {
                        return false;
                    }
                    if r < t1 {
                        t1 = r;
                    }
                }
            }
        }
        t0 <= t1
    }
}

impl From<Rect<f64>> for Envelope2D {
    fn from(rect: Rect<f64>) -> Self {
        Envelope2D {
            xmin: rect.min().x,
            ymin: rect.min().y,
            xmax: rect.max().x,
            ymax: rect.max().y,
        }
    }
}

impl From<Line<f64>> for Envelope2D {
    fn from(line: Line<f64>) -> Self {
        Envelope2D::new(line.start.x, line.start.y, line.end.x, line.end.y)
    }
}

impl From<Coordinate<f64>> for Envelope2D {
    fn from(pt: Coordinate<f64>) -> Self {
        Envelope2D::from_point(pt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_basics() {
        let mut iv = Envelope1D::empty();
        assert!(iv.is_empty());
        iv.merge(3.);
        iv.merge(-1.);
        assert_eq!(iv, Envelope1D::new(3., -1.));
        assert_eq!(iv.length(), 4.);
        assert!(iv.is_intersecting(&Envelope1D::from(3.)));
        assert!(!iv.is_intersecting(&Envelope1D::from(3.5)));
        assert!(!iv.is_intersecting(&Envelope1D::empty()));
        assert!(iv.inflate(0.5).contains(3.5));
    }

    #[test]
    fn box_basics() {
        let mut env = Envelope2D::empty();
        env.merge_point(Coordinate { x: 1., y: 2. });
        env.merge_point(Coordinate { x: -1., y: 5. });
        assert_eq!(env, Envelope2D::new(-1., 2., 1., 5.));
        assert_eq!(env.center(), Coordinate { x: 0., y: 3.5 });

        let other = Envelope2D::new(1.5, 0., 3., 1.);
        assert!(!env.is_intersecting(&other));
        assert!(env.inflate(0.5, 1.).is_intersecting(&other));
        assert!(env.inflate(1., 1.).contains(&Envelope2D::new(0., 2., 1., 3.)));
    }

    #[test]
    fn line_clipping() {
        let env = Envelope2D::new(0., 0., 1., 1.);
        let crossing = Line::from([(-1., 0.5), (2., 0.5)]);
        let diagonal_miss = Line::from([(1.5, 0.), (3., 1.5)]);
        let inside = Line::from([(0.2, 0.2), (0.3, 0.4)]);
        let vertical_miss = Line::from([(1.2, -1.), (1.2, 3.)]);

        assert!(env.is_intersecting_line(&crossing, 0.));
        assert!(env.is_intersecting_line(&inside, 0.));
        assert!(!env.is_intersecting_line(&diagonal_miss, 0.));
        assert!(!env.is_intersecting_line(&vertical_miss, 0.));
        assert!(env.is_intersecting_line(&vertical_miss, 0.25));
    }
}
