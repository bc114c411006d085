//! Mutable topology over a collection of geometries.
//!
//! An [`EditShape`] holds geometries as linked lists of paths, and paths
//! as linked lists of vertices. Geometries, paths and vertices are all
//! addressed by stable handles that survive any mutation other than their
//! own removal. Vertex coordinates and attributes live in per-shape
//! attribute streams indexed by the vertex handle.
//!
//! Vertices of a path are linked linearly; traversal of a closed path
//! wraps from the last vertex to the first one. A multipoint keeps its
//! vertices on a single open pseudo-path, a point on a path with one
//! vertex.
//!
//! Geometries go in through [`EditShape::add_geometry`] and come back out
//! through [`EditShape::get_geometry`], which reflects every mutation done
//! in between.
use geo::Coordinate;
use log::{debug, trace};
use slab::Slab;
use smallvec::SmallVec;

use crate::{
    attribute_stream::AttributeStreamOfDbl,
    envelope::Envelope2D,
    geometry::{Geometry, GeometryType, MultiPath, MultiPoint, PathKind, Point, Semantics, VertexDescription},
};

mod filter;
mod lookup;
mod split;
pub use lookup::VertexHash;

#[derive(Debug, Clone)]
struct GeometryRecord {
    kind: GeometryType,
    description: VertexDescription,
    prev: Option<usize>,
    next: Option<usize>,
    first_path: Option<usize>,
    last_path: Option<usize>,
    path_count: usize,
    point_count: usize,
}

#[derive(Debug, Clone)]
struct PathRecord {
    geometry: usize,
    prev: Option<usize>,
    next: Option<usize>,
    first_vertex: Option<usize>,
    last_vertex: Option<usize>,
    size: usize,
    closed: bool,
}

#[derive(Debug, Clone)]
struct VertexRecord {
    path: usize,
    prev: Option<usize>,
    next: Option<usize>,
    /// Retired handle that is never reissued.
    removed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EditShape {
    geometries: Slab<GeometryRecord>,
    first_geometry: Option<usize>,
    last_geometry: Option<usize>,
    paths: Slab<PathRecord>,
    vertices: Slab<VertexRecord>,
    total_point_count: usize,

    /// Union of the descriptions of all geometries.
    description: VertexDescription,
    /// Interleaved `x, y` per vertex handle.
    xy: AttributeStreamOfDbl,
    attributes: SmallVec<[(Semantics, AttributeStreamOfDbl); 3]>,
}

impl EditShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union of the vertex descriptions of all geometries.
    #[inline]
    pub fn description(&self) -> VertexDescription {
        self.description
    }

    fn geometry(&self, geometry: usize) -> &GeometryRecord {
        self.geometries
            .get(geometry)
            .unwrap_or_else(|| panic!("geometry {} does not exist", geometry))
    }

    fn path(&self, path: usize) -> &PathRecord {
        self.paths
            .get(path)
            .unwrap_or_else(|| panic!("path {} does not exist", path))
    }

    fn vertex(&self, vertex: usize) -> &VertexRecord {
        match self.vertices.get(vertex) {
            Some(rec) if !rec.removed => rec,
            _ => panic!("vertex {} does not exist or was removed", vertex),
        }
    }

    fn add_description(&mut self, description: VertexDescription) {
        let rows = self.xy.size() / 2;
        for semantics in description.extra_attributes() {
            if self.description.has_attribute(semantics) {
                continue;
            }
            self.description.add_attribute(semantics);
            self.attributes.push((
                semantics,
                AttributeStreamOfDbl::with_value(rows, semantics.default_value()),
            ));
        }
        self.attributes.sort_by_key(|(s, _)| *s);
    }

    fn ensure_rows(&mut self, vertex: usize) {
        let rows = vertex + 1;
        if self.xy.size() < 2 * rows {
            self.xy.resize_with_value(2 * rows, f64::NAN);
            for (semantics, stream) in self.attributes.iter_mut() {
                stream.resize_with_value(rows, semantics.default_value());
            }
        }
    }

    fn stream(&self, semantics: Semantics) -> Option<&AttributeStreamOfDbl> {
        self.attributes
            .iter()
            .find(|(s, _)| *s == semantics)
            .map(|(_, stream)| stream)
    }

    // Geometries

    /// Append an empty geometry.
    pub fn create_geometry(&mut self, kind: GeometryType, description: VertexDescription) -> usize {
        self.add_description(description);
        let geometry = self.geometries.insert(GeometryRecord {
            kind,
            description,
            prev: self.last_geometry,
            next: None,
            first_path: None,
            last_path: None,
            path_count: 0,
            point_count: 0,
        });
        match self.last_geometry {
            Some(last) => self.geometries[last].next = Some(geometry),
            None => self.first_geometry = Some(geometry),
        }
        self.last_geometry = Some(geometry);
        geometry
    }

    /// Remove a geometry with all its paths and vertices.
    pub fn remove_geometry(&mut self, geometry: usize) {
        let paths: SmallVec<[usize; 8]> = self.path_handles(geometry).collect();
        for path in paths {
            self.remove_path(path);
        }
        let rec = self.geometries.remove(geometry);
        match rec.prev {
            Some(prev) => self.geometries[prev].next = rec.next,
            None => self.first_geometry = rec.next,
        }
        match rec.next {
            Some(next) => self.geometries[next].prev = rec.prev,
            None => self.last_geometry = rec.prev,
        }
    }

    #[inline]
    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    #[inline]
    pub fn get_first_geometry(&self) -> Option<usize> {
        self.first_geometry
    }

    #[inline]
    pub fn get_next_geometry(&self, geometry: usize) -> Option<usize> {
        self.geometry(geometry).next
    }

    #[inline]
    pub fn get_prev_geometry(&self, geometry: usize) -> Option<usize> {
        self.geometry(geometry).prev
    }

    /// Geometries in order.
    pub fn geometry_handles(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.first_geometry, move |&g| self.geometries[g].next)
    }

    #[inline]
    pub fn get_geometry_type(&self, geometry: usize) -> GeometryType {
        self.geometry(geometry).kind
    }

    #[inline]
    pub fn get_geometry_description(&self, geometry: usize) -> VertexDescription {
        self.geometry(geometry).description
    }

    #[inline]
    pub fn get_path_count(&self, geometry: usize) -> usize {
        self.geometry(geometry).path_count
    }

    #[inline]
    pub fn get_point_count(&self, geometry: usize) -> usize {
        self.geometry(geometry).point_count
    }

    #[inline]
    pub fn get_total_point_count(&self) -> usize {
        self.total_point_count
    }

    // Paths

    #[inline]
    pub fn get_first_path(&self, geometry: usize) -> Option<usize> {
        self.geometry(geometry).first_path
    }

    #[inline]
    pub fn get_last_path(&self, geometry: usize) -> Option<usize> {
        self.geometry(geometry).last_path
    }

    #[inline]
    pub fn get_next_path(&self, path: usize) -> Option<usize> {
        self.path(path).next
    }

    #[inline]
    pub fn get_prev_path(&self, path: usize) -> Option<usize> {
        self.path(path).prev
    }

    /// Paths of a geometry in order.
    pub fn path_handles(&self, geometry: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.geometry(geometry).first_path, move |&p| self.paths[p].next)
    }

    /// Insert an empty path before `before`, or at the end when `None`.
    /// Paths of a polygon start closed.
    pub fn insert_path(&mut self, geometry: usize, before: Option<usize>) -> usize {
        let closed = self.geometry(geometry).kind == GeometryType::Polygon;
        let prev = match before {
            Some(b) => {
                assert_eq!(
                    self.path(b).geometry,
                    geometry,
                    "path {} is not in geometry {}",
                    b,
                    geometry
                );
                self.paths[b].prev
            }
            None => self.geometries[geometry].last_path,
        };
        let path = self.paths.insert(PathRecord {
            geometry,
            prev,
            next: before,
            first_vertex: None,
            last_vertex: None,
            size: 0,
            closed,
        });
        match prev {
            Some(p) => self.paths[p].next = Some(path),
            None => self.geometries[geometry].first_path = Some(path),
        }
        match before {
            Some(b) => self.paths[b].prev = Some(path),
            None => self.geometries[geometry].last_path = Some(path),
        }
        self.geometries[geometry].path_count += 1;
        path
    }

    /// Remove a path with all its vertices. The vertex handles are
    /// released for reuse.
    pub fn remove_path(&mut self, path: usize) {
        let vertices: SmallVec<[usize; 32]> = self.path_vertices(path).collect();
        for &v in vertices.iter() {
            self.vertices.remove(v);
        }
        let rec = self.paths.remove(path);
        let geometry = &mut self.geometries[rec.geometry];
        geometry.path_count -= 1;
        geometry.point_count -= rec.size;
        match rec.prev {
            Some(prev) => self.paths[prev].next = rec.next,
            None => self.geometries[rec.geometry].first_path = rec.next,
        }
        match rec.next {
            Some(next) => self.paths[next].prev = rec.prev,
            None => self.geometries[rec.geometry].last_path = rec.prev,
        }
        self.total_point_count -= rec.size;
        trace!("edit shape: removed path {} ({} vertices)", path, rec.size);
    }

    #[inline]
    pub fn get_path_size(&self, path: usize) -> usize {
        self.path(path).size
    }

    #[inline]
    pub fn is_closed_path(&self, path: usize) -> bool {
        self.path(path).closed
    }

    /// Change the closedness of a path. Closing does not duplicate the
    /// start vertex.
    pub fn set_closed_path(&mut self, path: usize, closed: bool) {
        self.path(path);
        self.paths[path].closed = closed;
    }

    #[inline]
    pub fn get_geometry_from_path(&self, path: usize) -> usize {
        self.path(path).geometry
    }

    // Vertices

    #[inline]
    pub fn get_first_vertex(&self, path: usize) -> Option<usize> {
        self.path(path).first_vertex
    }

    #[inline]
    pub fn get_last_vertex(&self, path: usize) -> Option<usize> {
        self.path(path).last_vertex
    }

    /// Vertex following `vertex` on its path. On a closed path the last
    /// vertex is followed by the first one.
    pub fn get_next_vertex(&self, vertex: usize) -> Option<usize> {
        let rec = self.vertex(vertex);
        match rec.next {
            Some(next) => Some(next),
            None => {
                let path = &self.paths[rec.path];
                if path.closed && path.first_vertex != Some(vertex) {
                    path.first_vertex
                } else {
                    None
                }
            }
        }
    }

    /// Vertex preceding `vertex`; wraps on a closed path.
    pub fn get_prev_vertex(&self, vertex: usize) -> Option<usize> {
        let rec = self.vertex(vertex);
        match rec.prev {
            Some(prev) => Some(prev),
            None => {
                let path = &self.paths[rec.path];
                if path.closed && path.last_vertex != Some(vertex) {
                    path.last_vertex
                } else {
                    None
                }
            }
        }
    }

    /// Vertices of a path from first to last, without wrapping.
    pub fn path_vertices(&self, path: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.path(path).first_vertex, move |&v| self.vertices[v].next)
    }

    #[inline]
    pub fn get_path_from_vertex(&self, vertex: usize) -> usize {
        self.vertex(vertex).path
    }

    #[inline]
    pub fn get_geometry_from_vertex(&self, vertex: usize) -> usize {
        self.paths[self.vertex(vertex).path].geometry
    }

    /// Whether the handle no longer names a vertex.
    pub fn is_removed_vertex(&self, vertex: usize) -> bool {
        self.vertices.get(vertex).map_or(true, |rec| rec.removed)
    }

    /// Append a vertex to the end of a path.
    pub fn add_vertex(&mut self, path: usize, point: &Point) -> usize {
        self.insert_vertex(path, None, point)
    }

    /// Insert a vertex before `before`, or at the end when `None`.
    /// Inserting before the first vertex makes the new one first.
    pub fn insert_vertex(&mut self, path: usize, before: Option<usize>, point: &Point) -> usize {
        let geometry = self.path(path).geometry;
        let prev = match before {
            Some(b) => {
                assert_eq!(self.vertex(b).path, path, "vertex {} is not on path {}", b, path);
                self.vertices[b].prev
            }
            None => self.paths[path].last_vertex,
        };

        let description = self.geometries[geometry]
            .description
            .merge(&point.description());
        self.geometries[geometry].description = description;
        self.add_description(description);

        let vertex = self.vertices.insert(VertexRecord {
            path,
            prev,
            next: before,
            removed: false,
        });
        match prev {
            Some(p) => self.vertices[p].next = Some(vertex),
            None => self.paths[path].first_vertex = Some(vertex),
        }
        match before {
            Some(b) => self.vertices[b].prev = Some(vertex),
            None => self.paths[path].last_vertex = Some(vertex),
        }
        self.paths[path].size += 1;
        self.geometries[geometry].point_count += 1;
        self.total_point_count += 1;

        self.ensure_rows(vertex);
        self.xy.write(2 * vertex, point.x());
        self.xy.write(2 * vertex + 1, point.y());
        for (semantics, stream) in self.attributes.iter_mut() {
            stream.write(vertex, point.attribute(*semantics, 0));
        }
        vertex
    }

    /// Remove a vertex and return the vertex that followed it (wrapping on
    /// a closed path), so that removals can be chained.
    ///
    /// With `scale_back` the handle is released and may be reissued by a
    /// later insertion. Otherwise it is retired for good.
    pub fn remove_vertex(&mut self, vertex: usize, scale_back: bool) -> Option<usize> {
        let VertexRecord { path, prev, next, .. } = *self.vertex(vertex);
        let following = self.get_next_vertex(vertex);

        match prev {
            Some(p) => self.vertices[p].next = next,
            None => self.paths[path].first_vertex = next,
        }
        match next {
            Some(n) => self.vertices[n].prev = prev,
            None => self.paths[path].last_vertex = prev,
        }
        let geometry = self.paths[path].geometry;
        self.paths[path].size -= 1;
        self.geometries[geometry].point_count -= 1;
        self.total_point_count -= 1;

        if scale_back {
            self.vertices.remove(vertex);
        } else {
            let rec = &mut self.vertices[vertex];
            rec.removed = true;
            rec.prev = None;
            rec.next = None;
        }
        trace!("edit shape: removed vertex {} (scale_back = {})", vertex, scale_back);
        following
    }

    #[inline]
    pub fn get_xy(&self, vertex: usize) -> Coordinate<f64> {
        self.vertex(vertex);
        Coordinate {
            x: self.xy.read(2 * vertex),
            y: self.xy.read(2 * vertex + 1),
        }
    }

    pub fn set_xy(&mut self, vertex: usize, xy: Coordinate<f64>) {
        self.vertex(vertex);
        self.xy.write(2 * vertex, xy.x);
        self.xy.write(2 * vertex + 1, xy.y);
    }

    /// Attribute value of a vertex. Attributes the shape does not carry
    /// read as their default.
    pub fn get_attribute_as_dbl(&self, semantics: Semantics, vertex: usize, ordinate: usize) -> f64 {
        self.vertex(vertex);
        match semantics {
            Semantics::Position => self.xy.read(2 * vertex + ordinate.min(1)),
            _ => self
                .stream(semantics)
                .map_or_else(|| semantics.default_value(), |s| s.read(vertex)),
        }
    }

    /// Write an attribute value, adding the attribute to the vertex's
    /// geometry when missing.
    pub fn set_attribute(&mut self, semantics: Semantics, vertex: usize, ordinate: usize, value: f64) {
        let geometry = self.get_geometry_from_vertex(vertex);
        if semantics == Semantics::Position {
            self.xy.write(2 * vertex + ordinate.min(1), value);
            return;
        }
        let description = self.geometries[geometry].description.with(semantics);
        self.geometries[geometry].description = description;
        self.add_description(description);
        if let Some((_, stream)) = self.attributes.iter_mut().find(|(s, _)| *s == semantics) {
            stream.write(vertex, value);
        }
    }

    /// The vertex as a point carrying the attributes of its geometry.
    pub fn get_point(&self, vertex: usize) -> Point {
        let description = self.geometries[self.get_geometry_from_vertex(vertex)].description;
        self.point_with(vertex, description)
    }

    fn point_with(&self, vertex: usize, description: VertexDescription) -> Point {
        let xy = self.get_xy(vertex);
        let mut point = Point::new(xy.x, xy.y);
        for semantics in description.extra_attributes() {
            point.set_attribute(semantics, 0, self.get_attribute_as_dbl(semantics, vertex, 0));
        }
        point
    }

    /// Bounding box of all vertices of a geometry.
    pub fn get_envelope(&self, geometry: usize) -> Envelope2D {
        let mut env = Envelope2D::empty();
        for path in self.path_handles(geometry) {
            for vertex in self.path_vertices(path) {
                env.merge_point(self.get_xy(vertex));
            }
        }
        env
    }

    // Conversion

    /// Copy a geometry into the shape and return its handle. Vertex order,
    /// path boundaries, closed flags and attributes are preserved.
    pub fn add_geometry(&mut self, geometry: &Geometry) -> usize {
        let handle = self.create_geometry(geometry.geometry_type(), geometry.description());
        match geometry {
            Geometry::Point(point) => {
                if !point.is_empty() {
                    let path = self.insert_path(handle, None);
                    self.add_vertex(path, point);
                }
            }
            Geometry::MultiPoint(mp) => {
                if !mp.is_empty() {
                    let path = self.insert_path(handle, None);
                    for i in 0..mp.point_count() {
                        self.add_vertex(path, &mp.get_point(i));
                    }
                }
            }
            Geometry::Polyline(mp) | Geometry::Polygon(mp) => {
                for p in 0..mp.path_count() {
                    let path = self.insert_path(handle, None);
                    self.set_closed_path(path, mp.is_closed_path(p));
                    for i in mp.path_start(p)..mp.path_end(p) {
                        self.add_vertex(path, &mp.get_point(i));
                    }
                }
            }
        }
        debug!(
            "edit shape: added {} {} with {} paths and {} points",
            geometry.geometry_type().name(),
            handle,
            self.get_path_count(handle),
            self.get_point_count(handle)
        );
        handle
    }

    /// Rebuild the geometry value. Empty paths are dropped.
    pub fn get_geometry(&self, geometry: usize) -> Geometry {
        let rec = self.geometry(geometry);
        let description = rec.description;
        match rec.kind {
            GeometryType::Point => {
                let point = rec
                    .first_path
                    .and_then(|p| self.paths[p].first_vertex)
                    .map(|v| self.point_with(v, description))
                    .unwrap_or_else(Point::empty);
                Geometry::Point(point)
            }
            GeometryType::MultiPoint => {
                let mut mp = MultiPoint::new(description);
                for path in self.path_handles(geometry) {
                    for vertex in self.path_vertices(path) {
                        mp.add(&self.point_with(vertex, description));
                    }
                }
                Geometry::MultiPoint(mp)
            }
            GeometryType::Polyline | GeometryType::Polygon => {
                let kind = if rec.kind == GeometryType::Polygon {
                    PathKind::Polygon
                } else {
                    PathKind::Polyline
                };
                let mut mp = MultiPath::new(kind, description);
                for path in self.path_handles(geometry) {
                    let points: Vec<Point> = self
                        .path_vertices(path)
                        .map(|v| self.point_with(v, description))
                        .collect();
                    mp.add_path(points.iter(), self.paths[path].closed);
                }
                Geometry::from(mp)
            }
        }
    }
}
