use std::f64::consts::PI;

use geo::{Coordinate, Line, LineString, Polygon, Rect};

use rand::Rng;
use rand_distr::{Standard, Uniform};

#[inline]
pub fn uniform_point<R: Rng>(rng: &mut R, bounds: Rect<f64>) -> Coordinate<f64> {
    let coords: [f64; 2] = rng.sample(Standard);
    let dims = bounds.max() - bounds.min();
    Coordinate {
        x: bounds.min().x + dims.x * coords[0],
        y: bounds.min().y + dims.y * coords[1],
    }
}

#[inline]
#[allow(dead_code)]
pub fn uniform_line<R: Rng>(rng: &mut R, bounds: Rect<f64>) -> Line<f64> {
    Line::new(uniform_point(rng, bounds), uniform_point(rng, bounds))
}

/// Star shaped ring around `center`: `steps` vertices at random angles,
/// each at a random distance between 40% and 100% of `radius`.
pub fn circular_polygon<R: Rng>(rng: &mut R, center: Coordinate<f64>, radius: f64, steps: usize) -> Polygon<f64> {
    let mut angles: Vec<f64> = (0..steps)
        .map(|_| rng.sample::<f64, _>(Standard) * 2. * PI)
        .collect();
    angles.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let radii = Uniform::new_inclusive(0.4 * radius, radius);
    let ring: Vec<Coordinate<f64>> = angles
        .into_iter()
        .map(|angle| {
            let r = rng.sample(radii);
            Coordinate {
                x: center.x + r * angle.cos(),
                y: center.y + r * angle.sin(),
            }
        })
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}
