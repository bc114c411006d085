use log::debug;
use smallvec::SmallVec;

use super::EditShape;
use crate::geometry::distance;

impl EditShape {
    /// Remove vertices within `tolerance` of the previous kept vertex on
    /// every polyline and polygon path, and return how many were removed.
    ///
    /// The end points of an open path are kept. A path whose vertices all
    /// merge into one is removed altogether; a ring that keeps two vertices
    /// stays as a degenerate ring. With `closed_paths_only`, open paths are
    /// not touched.
    /// With `keep_equilateral`, a closed path whose every edge is within
    /// tolerance is kept as is instead of collapsing.
    pub fn filter_close_points(&mut self, tolerance: f64, closed_paths_only: bool, keep_equilateral: bool) -> usize {
        let geometries: SmallVec<[usize; 8]> = self.geometry_handles().collect();
        let mut removed = 0;
        for geometry in geometries {
            if !self.get_geometry_type(geometry).is_multi_path() {
                continue;
            }
            let paths: SmallVec<[usize; 8]> = self.path_handles(geometry).collect();
            for path in paths {
                let closed = self.is_closed_path(path);
                if closed_paths_only && !closed {
                    continue;
                }
                removed += self.filter_path(path, tolerance, closed, keep_equilateral);
            }
        }
        debug!(
            "edit shape: filter_close_points({}) removed {} vertices",
            tolerance, removed
        );
        removed
    }

    fn filter_path(&mut self, path: usize, tolerance: f64, closed: bool, keep_equilateral: bool) -> usize {
        let is_close =
            |shape: &EditShape, a: usize, b: usize| distance(shape.get_xy(a), shape.get_xy(b)) <= tolerance;
        let vertices: SmallVec<[usize; 32]> = self.path_vertices(path).collect();
        let n = vertices.len();

        if closed
            && keep_equilateral
            && n > 1
            && (0..n).all(|i| is_close(self, vertices[i], vertices[(i + 1) % n]))
        {
            return 0;
        }

        let mut kept: SmallVec<[usize; 32]> = SmallVec::new();
        let mut doomed: SmallVec<[usize; 32]> = SmallVec::new();
        for &v in vertices.iter() {
            match kept.last() {
                Some(&anchor) if is_close(self, anchor, v) => doomed.push(v),
                _ => kept.push(v),
            }
        }

        if closed {
            while kept.len() > 1 && is_close(self, kept[kept.len() - 1], kept[0]) {
                if let Some(v) = kept.pop() {
                    doomed.push(v);
                }
            }
        } else if let (Some(&last), Some(&anchor)) = (vertices.last(), kept.last()) {
            // The end point survives in place of the kept vertex it is
            // close to.
            if anchor != last && kept.len() > 1 {
                kept.pop();
                doomed.retain(|v| *v != last);
                doomed.push(anchor);
                kept.push(last);
            }
        }

        if kept.len() < 2 {
            self.remove_path(path);
            return n;
        }
        for &v in doomed.iter() {
            self.remove_vertex(v, true);
        }
        doomed.len()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        edit_shape::EditShape,
        geometry::{Geometry, MultiPath, MultiPoint},
    };

    fn polygon(coords: &[(f64, f64)]) -> Geometry {
        let mut mp = MultiPath::polygon();
        let (x, y) = coords[0];
        mp.start_path_xy(x, y);
        for &(x, y) in &coords[1..] {
            mp.line_to_xy(x, y);
        }
        mp.into()
    }

    fn polyline(coords: &[(f64, f64)]) -> Geometry {
        let mut mp = MultiPath::polyline();
        let (x, y) = coords[0];
        mp.start_path_xy(x, y);
        for &(x, y) in &coords[1..] {
            mp.line_to_xy(x, y);
        }
        mp.into()
    }

    #[test]
    fn degenerate_triangle_collapses() {
        let mut shape = EditShape::new();
        let g = shape.add_geometry(&polygon(&[(0., 0.), (0.001, 0.), (0., 0.001)]));
        assert_eq!(shape.filter_close_points(0.01, false, false), 3);
        assert_eq!(shape.get_path_count(g), 0);
        assert!(shape.get_geometry(g).is_empty());
    }

    #[test]
    fn keep_equilateral_rings() {
        let mut shape = EditShape::new();
        let g = shape.add_geometry(&polygon(&[(0., 0.), (0.001, 0.), (0., 0.001)]));
        assert_eq!(shape.filter_close_points(0.01, true, true), 0);
        assert_eq!(shape.get_point_count(g), 3);
    }

    #[test]
    fn ring_drops_close_neighbours() {
        let mut shape = EditShape::new();
        let g = shape.add_geometry(&polygon(&[
            (0., 0.),
            (5., 0.),
            (5.05, 0.),
            (5., 5.),
            (0., 5.),
            (0., 0.05),
        ]));
        assert_eq!(shape.filter_close_points(0.1, false, false), 2);
        let path = shape.get_first_path(g).unwrap();
        let xs: Vec<_> = shape
            .path_vertices(path)
            .map(|v| shape.get_xy(v))
            .map(|c| (c.x, c.y))
            .collect();
        assert_eq!(xs, vec![(0., 0.), (5., 0.), (5., 5.), (0., 5.)]);
    }

    #[test]
    fn open_path_keeps_end_points() {
        let mut shape = EditShape::new();
        let g = shape.add_geometry(&polyline(&[(0., 0.), (0.05, 0.), (3., 0.), (5.95, 0.), (6., 0.)]));
        let ring = shape.add_geometry(&polygon(&[(0., 0.), (0.01, 0.), (0., 3.)]));

        // Only the ring is filtered.
        assert_eq!(shape.filter_close_points(0.1, true, false), 1);
        assert_eq!(shape.get_point_count(g), 5);
        assert_eq!(shape.get_point_count(ring), 2);

        assert_eq!(shape.filter_close_points(0.1, false, false), 2);
        let path = shape.get_first_path(g).unwrap();
        let first = shape.get_first_vertex(path).unwrap();
        let last = shape.get_last_vertex(path).unwrap();
        assert_eq!(shape.get_xy(first).x, 0.);
        assert_eq!(shape.get_xy(last).x, 6.);
        assert_eq!(shape.get_path_size(path), 3);
    }

    #[test]
    fn one_close_pair_keeps_the_ring() {
        let mut shape = EditShape::new();
        let g = shape.add_geometry(&polygon(&[(0., 0.), (0.001, 0.), (0., 3.)]));
        assert_eq!(shape.filter_close_points(0.01, false, false), 1);
        assert_eq!(shape.get_path_count(g), 1);
        assert_eq!(shape.get_point_count(g), 2);
        assert!(!shape.get_geometry(g).is_empty());

        // Nothing is left to merge.
        assert_eq!(shape.filter_close_points(0.01, false, false), 0);
    }

    #[test]
    fn multipoints_are_not_filtered() {
        let mut shape = EditShape::new();
        let mut mp = MultiPoint::default();
        mp.add_xy(0., 0.);
        mp.add_xy(0., 0.);
        let g = shape.add_geometry(&mp.into());
        assert_eq!(shape.filter_close_points(1., false, false), 0);
        assert_eq!(shape.get_point_count(g), 2);
    }
}
