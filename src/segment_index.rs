//! Spatial indexes over the segments of multipaths and edit shapes.
//!
//! These are the entry points boolean operators use to find candidate
//! segment pairs: a [`QuadTree`] to probe one geometry with segments of
//! another, or an [`Envelope2DIntersector`] to enumerate all red/blue
//! candidates in one sweep. Both report the same pairs for the same
//! tolerance.
use crate::{
    edit_shape::EditShape, envelope::Envelope2D, envelope_intersector::Envelope2DIntersector,
    geometry::MultiPath, quad_tree::QuadTree,
};

/// Extent for a quad tree over `env`; an empty input gets a degenerate box
/// at the origin.
fn tree_extent(env: Envelope2D) -> Envelope2D {
    if env.is_empty() {
        Envelope2D::new(0., 0., 0., 0.)
    } else {
        env
    }
}

/// Quad tree over the segment envelopes of `multi_path`. Element ids are
/// global segment indices, in the order of [`MultiPath::segments`].
pub fn build_quad_tree(multi_path: &MultiPath, height: usize) -> QuadTree {
    let mut tree = QuadTree::new(tree_extent(multi_path.envelope()), height);
    let mut hint = None;
    for (id, (_, line)) in multi_path.segments().enumerate() {
        hint = Some(tree.insert(id, line.into(), hint));
    }
    tree
}

/// Red/blue intersector over the segment envelopes of two multipaths.
/// Handles are global segment indices.
pub fn segment_intersector(red: &MultiPath, blue: &MultiPath, tolerance: f64) -> Envelope2DIntersector {
    let mut intersector = Envelope2DIntersector::new();
    intersector.set_tolerance(tolerance);
    intersector.start_red_construction();
    for (id, (_, line)) in red.segments().enumerate() {
        intersector.add_red_envelope(id, line.into());
    }
    intersector.end_red_construction();
    intersector.start_blue_construction();
    for (id, (_, line)) in blue.segments().enumerate() {
        intersector.add_blue_envelope(id, line.into());
    }
    intersector.end_blue_construction();
    intersector
}

/// Quad tree over the segments of one edit-shape geometry. Element ids are
/// the handles of the segment start vertices.
pub fn edit_shape_quad_tree(shape: &EditShape, geometry: usize, height: usize) -> QuadTree {
    let mut tree = QuadTree::new(tree_extent(shape.get_envelope(geometry)), height);
    let mut hint = None;
    for path in shape.path_handles(geometry) {
        for vertex in shape.path_vertices(path) {
            if let Some(env) = shape.get_segment_envelope(vertex) {
                hint = Some(tree.insert(vertex, env, hint));
            }
        }
    }
    tree
}
