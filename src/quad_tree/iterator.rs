use geo::Line;
use smallvec::SmallVec;

use super::QuadTree;
use crate::envelope::Envelope2D;

/// Shape a [`QuadTree`] is queried with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryShape {
    Envelope(Envelope2D),
    Segment(Line<f64>),
}

impl QueryShape {
    /// Bounding box of the shape.
    pub fn envelope(&self) -> Envelope2D {
        match self {
            QueryShape::Envelope(env) => *env,
            QueryShape::Segment(line) => Envelope2D::from(*line),
        }
    }

    /// Whether `extent` is reached by the shape within `tolerance`.
    ///
    /// An envelope query is grown by the tolerance and tested against the
    /// unmodified `extent`; a segment is clipped against `extent` grown by
    /// the tolerance.
    pub fn is_intersecting(&self, extent: &Envelope2D, tolerance: f64) -> bool {
        match self {
            QueryShape::Envelope(env) => env.inflate(tolerance, tolerance).is_intersecting(extent),
            QueryShape::Segment(line) => extent.is_intersecting_line(line, tolerance),
        }
    }
}

impl From<Envelope2D> for QueryShape {
    fn from(env: Envelope2D) -> Self {
        QueryShape::Envelope(env)
    }
}

impl From<Line<f64>> for QueryShape {
    fn from(line: Line<f64>) -> Self {
        QueryShape::Segment(line)
    }
}

/// Resettable cursor over the elements of a [`QuadTree`] matching a query
/// shape. Yields element handles.
#[derive(Debug, Clone)]
pub struct QuadTreeIterator<'a> {
    tree: &'a QuadTree,
    query: Option<QueryShape>,
    tolerance: f64,
    stack: SmallVec<[usize; 32]>,
    /// Quad whose elements are being scanned, with the scan position.
    scan: Option<(usize, usize)>,
}

impl<'a> QuadTreeIterator<'a> {
    pub(super) fn new(tree: &'a QuadTree) -> Self {
        QuadTreeIterator {
            tree,
            query: None,
            tolerance: 0.,
            stack: SmallVec::new(),
            scan: None,
        }
    }

    /// Restart the iteration for a new query shape and tolerance.
    pub fn reset_iterator<Q: Into<QueryShape>>(&mut self, query: Q, tolerance: f64) {
        let query = query.into();
        self.stack.clear();
        self.scan = None;
        self.tolerance = tolerance;
        self.query = Some(query);
        if !query.envelope().is_empty() {
            self.stack.push(self.tree.root);
        }
    }

    #[inline]
    pub fn query(&self) -> Option<QueryShape> {
        self.query
    }

    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl<'a> Iterator for QuadTreeIterator<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let tree = self.tree;
        let query = self.query?;
        loop {
            if let Some((quad, position)) = self.scan.as_mut() {
                let elements = &tree.quads[*quad].elements;
                while *position < elements.len() {
                    let element = elements[*position];
                    *position += 1;
                    if query.is_intersecting(&tree.elements[element].extent, self.tolerance) {
                        return Some(element);
                    }
                }
                self.scan = None;
            }

            let quad = self.stack.pop()?;
            let node = &tree.quads[quad];
            if node.subtree_count == 0 {
                continue;
            }
            for &child in node.children.iter().rev().flatten() {
                let child_node = &tree.quads[child];
                if child_node.subtree_count > 0
                    && query.is_intersecting(&child_node.extent, self.tolerance)
                {
                    self.stack.push(child);
                }
            }
            if !node.elements.is_empty() {
                self.scan = Some((quad, 0));
            }
        }
    }
}
