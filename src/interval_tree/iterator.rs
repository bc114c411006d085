use smallvec::SmallVec;

use super::IntervalTree;
use crate::envelope::Envelope1D;

#[derive(Debug, Clone, Copy)]
enum ScanMode {
    /// Query covers the node center: every interval matches.
    All,
    /// Query is left of the center: scan while `vmin <= qmax`.
    ByMin,
    /// Query is right of the center: scan while `vmax >= qmin`.
    ByMax,
}

#[derive(Debug, Clone, Copy)]
struct Scan {
    node: usize,
    mode: ScanMode,
    position: usize,
}

/// Resettable cursor over the intervals of an [`IntervalTree`] matching a
/// query.
///
/// Reuse one iterator through [`reset_iterator`](Self::reset_iterator)
/// across many queries; the traversal stack is kept between resets.
#[derive(Debug, Clone)]
pub struct IntervalTreeIterator<'a> {
    tree: &'a IntervalTree,
    query: Envelope1D,
    stack: SmallVec<[usize; 32]>,
    scan: Option<Scan>,
}

impl<'a> IntervalTreeIterator<'a> {
    pub(super) fn new(tree: &'a IntervalTree) -> Self {
        IntervalTreeIterator {
            tree,
            query: Envelope1D::empty(),
            stack: SmallVec::new(),
            scan: None,
        }
    }

    /// Restart the iteration for a new `query` and `tolerance`.
    pub fn reset_iterator<Q: Into<Envelope1D>>(&mut self, query: Q, tolerance: f64) {
        self.query = query.into().inflate(tolerance);
        self.stack.clear();
        self.scan = None;
        if let Some(root) = self.tree.root {
            if !self.query.is_empty() {
                self.stack.push(root);
            }
        }
    }

    fn next_in_scan(&mut self) -> Option<usize> {
        let tree = self.tree;
        let scan = self.scan.as_mut()?;
        let node = &tree.nodes[scan.node];
        while scan.position < node.by_min.len() {
            let handle = match scan.mode {
                ScanMode::All => node.by_min[scan.position],
                ScanMode::ByMin => {
                    let h = node.by_min[scan.position];
                    if tree.intervals[h].vmin > self.query.vmax {
                        break;
                    }
                    h
                }
                ScanMode::ByMax => {
                    let h = node.by_max[scan.position];
                    if tree.intervals[h].vmax < self.query.vmin {
                        break;
                    }
                    h
                }
            };
            scan.position += 1;
            if tree.active[handle] {
                return Some(handle);
            }
        }
        self.scan = None;
        None
    }
}

impl<'a> Iterator for IntervalTreeIterator<'a> {
    type Item = usize;

    /// Handle of the next matching interval, `None` once exhausted.
    fn next(&mut self) -> Option<usize> {
        loop {
            if let Some(handle) = self.next_in_scan() {
                return Some(handle);
            }
            let tree = self.tree;
            let key = self.stack.pop()?;
            let node = &tree.nodes[key];
            if node.subtree_active == 0 {
                continue;
            }

            let mode = if node.center < self.query.vmin {
                self.stack.extend(node.right);
                ScanMode::ByMax
            } else if node.center > self.query.vmax {
                self.stack.extend(node.left);
                ScanMode::ByMin
            } else {
                self.stack.extend(node.right);
                self.stack.extend(node.left);
                ScanMode::All
            };
            if node.active > 0 {
                self.scan = Some(Scan {
                    node: key,
                    mode,
                    position: 0,
                });
            }
        }
    }
}
