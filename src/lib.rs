//! Spatial indexing and topology editing for planar geometries.
//!
//! 1. [Attribute streams](#attribute-streams)
//! 1. [Spatial indexes](#spatial-indexes)
//! 1. [Edit shape](#edit-shape)
//!
//! # Attribute Streams
//!
//! [`AttributeStream`] is the typed growable array every multi-vertex
//! geometry stores its coordinates and vertex attributes in. Besides the
//! usual element access it supports bulk range copies, optionally
//! reversing groups of `stride` elements.
//!
//! # Spatial Indexes
//!
//! Candidate pairs of boxes are found with one of three structures:
//!
//! - [`IntervalTree`] answers 1D overlap queries, optionally over a
//!   dynamic subset of its intervals;
//! - [`Envelope2DIntersector`] enumerates all intersecting pairs of one or
//!   two collections of boxes in a single sweep;
//! - [`QuadTree`] indexes boxes over a fixed extent and answers box or
//!   segment queries.
//!
//! All of them take a tolerance. The query iterators are meant to be
//! reused through their `reset_iterator` methods.
//!
//! ```rust
//! use geo_topology::{Envelope2D, Envelope2DIntersector};
//! let mut intersector = Envelope2DIntersector::new();
//! intersector.start_construction();
//! for id in 0..4 {
//!     intersector.add_envelope(id, Envelope2D::new(0., 0., 1., 1.));
//! }
//! intersector.end_construction();
//! let mut pairs = 0;
//! while intersector.next() {
//!     pairs += 1;
//! }
//! assert_eq!(pairs, 6);
//! ```
//!
//! # Edit Shape
//!
//! [`EditShape`] turns [`Geometry`] values into a mutable topology with
//! stable geometry / path / vertex handles. Segments can be split with
//! attribute interpolation, vertices removed, close points filtered, and
//! the result read back as geometry values. [`segment_index`] builds the
//! spatial indexes above over the segments of a geometry or edit shape.
//!
//! ```rust
//! use geo_topology::{EditShape, Geometry, MultiPath};
//! let mut ring = MultiPath::polygon();
//! ring.start_path_xy(0., 0.);
//! ring.line_to_xy(2., 0.);
//! ring.line_to_xy(2., 2.);
//!
//! let mut shape = EditShape::new();
//! let g = shape.add_geometry(&Geometry::from(ring));
//! let path = shape.get_first_path(g).unwrap();
//! let v = shape.get_first_vertex(path).unwrap();
//! shape.split_segment(v, &[0.5]).unwrap();
//! assert_eq!(shape.get_point_count(g), 4);
//! ```
pub mod error;
pub use error::{GeometryError, Result};

pub mod attribute_stream;
pub use attribute_stream::{
    AttributeStream, AttributeStreamOfDbl, AttributeStreamOfFloat, AttributeStreamOfInt16,
    AttributeStreamOfInt32, AttributeStreamOfInt64, AttributeStreamOfInt8, AttributeValue,
};

pub mod envelope;
pub use envelope::{Envelope1D, Envelope2D};

pub mod geometry;
pub use geometry::{
    Geometry, GeometryType, MultiPath, MultiPoint, PathKind, Point, Semantics, VertexDescription,
};

pub mod index_hash_table;
pub use index_hash_table::{HashFunction, IndexHashTable};

pub mod interval_tree;
pub use interval_tree::{IntervalTree, IntervalTreeIterator};

pub mod envelope_intersector;
pub use envelope_intersector::Envelope2DIntersector;

pub mod quad_tree;
pub use quad_tree::{QuadTree, QuadTreeIterator, QueryShape};

pub mod edit_shape;
pub use edit_shape::EditShape;

pub mod segment_index;

#[cfg(test)]
#[path = "../benches/utils/random.rs"]
pub mod random;

#[cfg(test)]
pub(crate) fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}
