//! Batch discovery of intersecting pairs among 2D envelopes.
//!
//! [`Envelope2DIntersector`] is filled once and then enumerates, through a
//! resettable cursor, either
//!
//! 1. every pair of intersecting envelopes of a single collection
//!    ([`start_construction`](Envelope2DIntersector::start_construction)), or
//! 1. every intersecting `(red, blue)` pair across two collections
//!    ([`start_red_construction`](Envelope2DIntersector::start_red_construction)
//!    and [`start_blue_construction`](Envelope2DIntersector::start_blue_construction)).
//!
//! # Tolerance
//!
//! A pair `(a, b)` is reported iff `a` grown by the tolerance on every side
//! intersects the unmodified `b`. The `a` side is the red envelope in the
//! two-collection mode, and the envelope with the smaller index in the
//! single-collection mode.
//!
//! # Algorithm
//!
//! A plane sweep along `x`. The `y` extents of all envelopes are loaded into
//! a dynamic [`IntervalTree`] up front; while the sweep runs, envelopes whose
//! `x` extent covers the sweep position are active in the tree. An envelope
//! entering the sweep queries the tree of the opposite collection (or its
//! own collection in single mode) and each candidate is confirmed with the
//! exact predicate above. Pairs are produced lazily, one event at a time.
use log::{debug, trace};

use crate::{envelope::Envelope2D, interval_tree::IntervalTree};

mod events;
use events::{Event, EventType, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Empty,
    Constructing,
    Constructed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Unset,
    Single,
    RedBlue,
}

#[derive(Debug, Clone)]
struct Collection {
    phase: Phase,
    ids: Vec<usize>,
    envelopes: Vec<Envelope2D>,
    tree: IntervalTree,
}

impl Collection {
    fn new() -> Self {
        Collection {
            phase: Phase::Empty,
            ids: Vec::new(),
            envelopes: Vec::new(),
            tree: IntervalTree::new(true),
        }
    }

    fn start(&mut self) {
        self.phase = Phase::Constructing;
        self.ids.clear();
        self.envelopes.clear();
    }

    fn add(&mut self, id: usize, envelope: Envelope2D) {
        assert_eq!(
            self.phase,
            Phase::Constructing,
            "envelope added outside of construction"
        );
        self.ids.push(id);
        self.envelopes.push(envelope);
    }

    fn end(&mut self) {
        assert_eq!(
            self.phase,
            Phase::Constructing,
            "end of construction without a start"
        );
        self.tree.start_construction();
        for env in self.envelopes.iter() {
            self.tree.add_interval(env.y_interval());
        }
        self.tree.end_construction();
        self.phase = Phase::Constructed;
    }
}

/// Offline pairwise envelope intersection finder.
#[derive(Debug, Clone)]
pub struct Envelope2DIntersector {
    tolerance: f64,
    mode: Mode,
    red: Collection,
    blue: Collection,

    prepared: bool,
    events: Vec<Event>,
    event_index: usize,
    pending: Vec<(usize, usize)>,
    pending_index: usize,
    current: Option<(usize, usize)>,
}

impl Default for Envelope2DIntersector {
    fn default() -> Self {
        Self::new()
    }
}

impl Envelope2DIntersector {
    pub fn new() -> Self {
        Envelope2DIntersector {
            tolerance: 0.,
            mode: Mode::Unset,
            red: Collection::new(),
            blue: Collection::new(),
            prepared: false,
            events: Vec::new(),
            event_index: 0,
            pending: Vec::new(),
            pending_index: 0,
            current: None,
        }
    }

    /// Set the tolerance used by the intersection predicate. Takes effect
    /// from the next [`reset`](Self::reset) or first [`next`](Self::next).
    pub fn set_tolerance(&mut self, tolerance: f64) {
        assert!(tolerance >= 0., "tolerance must be non-negative");
        self.tolerance = tolerance;
        self.prepared = false;
    }

    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn start_construction(&mut self) {
        self.mode = Mode::Single;
        self.prepared = false;
        self.red.start();
        self.blue = Collection::new();
    }

    pub fn add_envelope(&mut self, id: usize, envelope: Envelope2D) {
        assert_eq!(self.mode, Mode::Single, "add_envelope requires start_construction");
        self.red.add(id, envelope);
    }

    pub fn end_construction(&mut self) {
        assert_eq!(self.mode, Mode::Single, "end_construction requires start_construction");
        self.red.end();
    }

    pub fn start_red_construction(&mut self) {
        self.enter_red_blue();
        self.red.start();
    }

    pub fn add_red_envelope(&mut self, id: usize, envelope: Envelope2D) {
        assert_eq!(self.mode, Mode::RedBlue, "add_red_envelope requires start_red_construction");
        self.red.add(id, envelope);
    }

    pub fn end_red_construction(&mut self) {
        assert_eq!(self.mode, Mode::RedBlue, "end_red_construction requires start_red_construction");
        self.red.end();
    }

    pub fn start_blue_construction(&mut self) {
        self.enter_red_blue();
        self.blue.start();
    }

    pub fn add_blue_envelope(&mut self, id: usize, envelope: Envelope2D) {
        assert_eq!(self.mode, Mode::RedBlue, "add_blue_envelope requires start_blue_construction");
        self.blue.add(id, envelope);
    }

    pub fn end_blue_construction(&mut self) {
        assert_eq!(self.mode, Mode::RedBlue, "end_blue_construction requires start_blue_construction");
        self.blue.end();
    }

    fn enter_red_blue(&mut self) {
        if self.mode != Mode::RedBlue {
            self.mode = Mode::RedBlue;
            self.red = Collection::new();
            self.blue = Collection::new();
        }
        self.prepared = false;
    }

    /// Number of envelopes in the single collection, or in the red one.
    pub fn envelope_count(&self) -> usize {
        self.red.envelopes.len()
    }

    pub fn blue_envelope_count(&self) -> usize {
        self.blue.envelopes.len()
    }

    /// Envelope at insertion position `index` of the single collection.
    pub fn envelope(&self, index: usize) -> Envelope2D {
        self.red.envelopes[index]
    }

    pub fn red_envelope(&self, index: usize) -> Envelope2D {
        self.red.envelopes[index]
    }

    pub fn blue_envelope(&self, index: usize) -> Envelope2D {
        self.blue.envelopes[index]
    }

    fn assert_constructed(&self) {
        match self.mode {
            Mode::Unset => panic!("envelope intersector queried before construction"),
            Mode::Single => assert_eq!(
                self.red.phase,
                Phase::Constructed,
                "envelope intersector queried before end_construction"
            ),
            Mode::RedBlue => assert!(
                self.red.phase == Phase::Constructed && self.blue.phase == Phase::Constructed,
                "envelope intersector queried before both red and blue construction ended"
            ),
        }
    }

    fn sweep_extension(&self) -> f64 {
        2. * self.tolerance
    }

    fn prepare(&mut self) {
        let ext = self.sweep_extension();
        self.events.clear();
        let push_events = |events: &mut Vec<Event>, side: Side, envelopes: &[Envelope2D]| {
            for (index, env) in envelopes.iter().enumerate() {
                if env.is_empty() {
                    continue;
                }
                events.push(Event::new(env.xmin, EventType::Enter, side, index));
                events.push(Event::new(env.xmax + ext, EventType::Leave, side, index));
            }
        };
        push_events(&mut self.events, Side::Red, &self.red.envelopes);
        if self.mode == Mode::RedBlue {
            push_events(&mut self.events, Side::Blue, &self.blue.envelopes);
        }
        self.events.sort_unstable();
        debug!(
            "envelope intersector: {n} sweep events, tolerance {tol}",
            n = self.events.len(),
            tol = self.tolerance
        );
        self.prepared = true;
    }

    /// Restart the enumeration from the first pair.
    pub fn reset(&mut self) {
        self.assert_constructed();
        if !self.prepared {
            self.prepare();
        }
        self.event_index = 0;
        self.pending.clear();
        self.pending_index = 0;
        self.current = None;
        for collection in [&mut self.red, &mut self.blue].iter_mut() {
            if collection.phase == Phase::Constructed {
                collection.tree.reset();
            }
        }
    }

    /// Advance to the next intersecting pair. Returns `false` when all
    /// pairs have been enumerated.
    pub fn next(&mut self) -> bool {
        if !self.prepared {
            self.reset();
        }
        loop {
            if self.pending_index < self.pending.len() {
                self.current = Some(self.pending[self.pending_index]);
                self.pending_index += 1;
                return true;
            }
            if self.event_index >= self.events.len() {
                self.current = None;
                return false;
            }
            self.pending.clear();
            self.pending_index = 0;
            let event = self.events[self.event_index];
            self.event_index += 1;
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: Event) {
        trace!("envelope intersector event: {:?}", event);
        let ext = self.sweep_extension();
        let tolerance = self.tolerance;
        match (self.mode, event.ty, event.side) {
            (_, EventType::Leave, Side::Red) => self.red.tree.remove(event.index),
            (_, EventType::Leave, Side::Blue) => self.blue.tree.remove(event.index),
            (Mode::Single, EventType::Enter, _) => {
                let envelopes = &self.red.envelopes;
                let query = envelopes[event.index].y_interval();
                for other in self.red.tree.get_iterator(query, ext) {
                    let (a, b) = if other < event.index {
                        (other, event.index)
                    } else {
                        (event.index, other)
                    };
                    if is_intersecting_with_tolerance(&envelopes[a], &envelopes[b], tolerance) {
                        self.pending.push((a, b));
                    }
                }
                self.red.tree.insert(event.index);
            }
            (_, EventType::Enter, Side::Red) => {
                let red = &self.red.envelopes[event.index];
                for blue in self.blue.tree.get_iterator(red.y_interval(), ext) {
                    if is_intersecting_with_tolerance(red, &self.blue.envelopes[blue], tolerance) {
                        self.pending.push((event.index, blue));
                    }
                }
                self.red.tree.insert(event.index);
            }
            (_, EventType::Enter, Side::Blue) => {
                let blue = &self.blue.envelopes[event.index];
                for red in self.red.tree.get_iterator(blue.y_interval(), ext) {
                    if is_intersecting_with_tolerance(&self.red.envelopes[red], blue, tolerance) {
                        self.pending.push((red, event.index));
                    }
                }
                self.blue.tree.insert(event.index);
            }
        }
    }

    fn current(&self) -> (usize, usize) {
        self.current
            .expect("no current pair; call next() and check it returned true")
    }

    /// Id of the first envelope of the current pair (the red one in the
    /// two-collection mode).
    pub fn get_handle_a(&self) -> usize {
        self.red.ids[self.current().0]
    }

    /// Id of the second envelope of the current pair (the blue one in the
    /// two-collection mode).
    pub fn get_handle_b(&self) -> usize {
        let (_, b) = self.current();
        match self.mode {
            Mode::RedBlue => self.blue.ids[b],
            _ => self.red.ids[b],
        }
    }
}

/// Grow `a` by `tolerance` and test it against the unmodified `b`.
#[inline]
fn is_intersecting_with_tolerance(a: &Envelope2D, b: &Envelope2D, tolerance: f64) -> bool {
    a.inflate(tolerance, tolerance).is_intersecting(b)
}
