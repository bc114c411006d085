//! Centered interval tree over [`Envelope1D`]s.
//!
//! The tree is built offline: register intervals between
//! [`IntervalTree::start_construction`] and
//! [`IntervalTree::end_construction`], then query through a resettable
//! [`IntervalTreeIterator`]. Each interval is identified by its insertion
//! order (its handle).
//!
//! A static tree answers queries over every registered interval. A dynamic
//! tree fixes its shape at construction, but only reports intervals that
//! are currently active; [`IntervalTree::insert`] and
//! [`IntervalTree::remove`] toggle membership without restructuring. This
//! is the mode used by sweep algorithms that know all intervals upfront.
//!
//! An interval `[lo, hi]` matches the query `[qlo, qhi]` with tolerance
//! `tol` iff `lo <= qhi + tol && hi >= qlo - tol`.
use log::debug;

use crate::envelope::Envelope1D;

mod iterator;
pub use iterator::IntervalTreeIterator;

#[derive(Debug, Clone)]
struct TreeNode {
    center: f64,
    parent: Option<usize>,
    left: Option<usize>,
    right: Option<usize>,
    /// Handles of the intervals containing `center`, by ascending `vmin`.
    by_min: Vec<usize>,
    /// The same handles, by descending `vmax`.
    by_max: Vec<usize>,
    active: usize,
    subtree_active: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Constructing,
    Constructed,
}

#[derive(Debug, Clone)]
pub struct IntervalTree {
    dynamic: bool,
    phase: Phase,
    intervals: Vec<Envelope1D>,
    active: Vec<bool>,
    /// Node storing each interval; `None` for empty intervals.
    interval_node: Vec<Option<usize>>,
    nodes: Vec<TreeNode>,
    root: Option<usize>,
    active_count: usize,
}

impl IntervalTree {
    pub fn new(dynamic: bool) -> Self {
        IntervalTree {
            dynamic,
            phase: Phase::Idle,
            intervals: Vec::new(),
            active: Vec::new(),
            interval_node: Vec::new(),
            nodes: Vec::new(),
            root: None,
            active_count: 0,
        }
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Discard all intervals and begin registering new ones.
    pub fn start_construction(&mut self) {
        self.phase = Phase::Constructing;
        self.intervals.clear();
        self.active.clear();
        self.interval_node.clear();
        self.nodes.clear();
        self.root = None;
        self.active_count = 0;
    }

    /// Register an interval and return its handle.
    pub fn add_interval(&mut self, interval: Envelope1D) -> usize {
        assert_eq!(
            self.phase,
            Phase::Constructing,
            "add_interval outside of construction"
        );
        self.intervals.push(interval);
        self.intervals.len() - 1
    }

    /// Build the tree. A static tree activates all intervals; a dynamic
    /// tree starts with none active.
    pub fn end_construction(&mut self) {
        assert_eq!(
            self.phase,
            Phase::Constructing,
            "end_construction without start_construction"
        );
        let n = self.intervals.len();
        self.active = vec![false; n];
        self.interval_node = vec![None; n];

        let handles: Vec<usize> = (0..n).filter(|&h| !self.intervals[h].is_empty()).collect();
        self.root = self.build(handles, None);
        self.phase = Phase::Constructed;
        debug!(
            "interval tree: {n} intervals in {nodes} nodes (dynamic = {dynamic})",
            nodes = self.nodes.len(),
            dynamic = self.dynamic
        );

        if !self.dynamic {
            for h in 0..n {
                self.activate(h);
            }
        }
    }

    fn build(&mut self, handles: Vec<usize>, parent: Option<usize>) -> Option<usize> {
        if handles.is_empty() {
            return None;
        }
        let mut ends: Vec<f64> = handles
            .iter()
            .flat_map(|&h| {
                let iv = self.intervals[h];
                [iv.vmin, iv.vmax]
            })
            .collect();
        let mid = ends.len() / 2;
        let center = *ends
            .select_nth_unstable_by(mid, |a, b| a.partial_cmp(b).expect("interval bounds are not NaN"))
            .1;

        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut here = Vec::new();
        for h in handles {
            let iv = self.intervals[h];
            if iv.vmax < center {
                left.push(h);
            } else if iv.vmin > center {
                right.push(h);
            } else {
                here.push(h);
            }
        }
        debug_assert!(!here.is_empty(), "center is an end point of some interval");

        let intervals = &self.intervals;
        let mut by_min = here.clone();
        by_min.sort_by(|&a, &b| intervals[a].vmin.partial_cmp(&intervals[b].vmin).unwrap());
        let mut by_max = here;
        by_max.sort_by(|&a, &b| intervals[b].vmax.partial_cmp(&intervals[a].vmax).unwrap());

        let key = self.nodes.len();
        for &h in by_min.iter() {
            self.interval_node[h] = Some(key);
        }
        self.nodes.push(TreeNode {
            center,
            parent,
            left: None,
            right: None,
            by_min,
            by_max,
            active: 0,
            subtree_active: 0,
        });
        let left = self.build(left, Some(key));
        let right = self.build(right, Some(key));
        self.nodes[key].left = left;
        self.nodes[key].right = right;
        Some(key)
    }

    fn assert_constructed(&self) {
        assert_eq!(
            self.phase,
            Phase::Constructed,
            "interval tree used before end_construction"
        );
    }

    fn activate(&mut self, handle: usize) {
        self.active[handle] = true;
        self.active_count += 1;
        if let Some(node) = self.interval_node[handle] {
            self.nodes[node].active += 1;
            let mut cursor = Some(node);
            while let Some(n) = cursor {
                self.nodes[n].subtree_active += 1;
                cursor = self.nodes[n].parent;
            }
        }
    }

    fn deactivate(&mut self, handle: usize) {
        self.active[handle] = false;
        self.active_count -= 1;
        if let Some(node) = self.interval_node[handle] {
            self.nodes[node].active -= 1;
            let mut cursor = Some(node);
            while let Some(n) = cursor {
                self.nodes[n].subtree_active -= 1;
                cursor = self.nodes[n].parent;
            }
        }
    }

    /// Make a registered interval visible to queries (dynamic trees only).
    pub fn insert(&mut self, handle: usize) {
        self.assert_constructed();
        assert!(self.dynamic, "insert requires a dynamic interval tree");
        assert!(!self.active[handle], "interval {} is already active", handle);
        self.activate(handle);
    }

    /// Hide a registered interval from queries (dynamic trees only).
    pub fn remove(&mut self, handle: usize) {
        self.assert_constructed();
        assert!(self.dynamic, "remove requires a dynamic interval tree");
        assert!(self.active[handle], "interval {} is not active", handle);
        self.deactivate(handle);
    }

    /// Deactivate every interval of a dynamic tree.
    pub fn reset(&mut self) {
        self.assert_constructed();
        assert!(self.dynamic, "reset requires a dynamic interval tree");
        for node in self.nodes.iter_mut() {
            node.active = 0;
            node.subtree_active = 0;
        }
        self.active.iter_mut().for_each(|a| *a = false);
        self.active_count = 0;
    }

    #[inline]
    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    #[inline]
    pub fn is_active(&self, handle: usize) -> bool {
        self.active[handle]
    }

    #[inline]
    pub fn interval(&self, handle: usize) -> Envelope1D {
        self.intervals[handle]
    }

    /// Iterator over the active intervals matching `query` (an interval or
    /// a point) within `tolerance`.
    pub fn get_iterator<Q: Into<Envelope1D>>(&self, query: Q, tolerance: f64) -> IntervalTreeIterator<'_> {
        self.assert_constructed();
        let mut iter = IntervalTreeIterator::new(self);
        iter.reset_iterator(query, tolerance);
        iter
    }
}
