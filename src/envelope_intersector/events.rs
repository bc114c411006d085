use std::cmp::Ordering;

/// Which collection an envelope belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum Side {
    Red,
    Blue,
}

/// Event type to associate with an event.
///
/// The ordering of the variants is important for the algorithm: at equal
/// `x`, envelopes entering the sweep must be processed before envelopes
/// leaving it, so that boxes that merely touch are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum EventType {
    Enter,
    Leave,
}

/// A sweep event along the `x` axis.
#[derive(Debug, Clone, Copy)]
pub(super) struct Event {
    pub(super) x: f64,
    pub(super) ty: EventType,
    pub(super) side: Side,
    pub(super) index: usize,
}

impl Event {
    pub(super) fn new(x: f64, ty: EventType, side: Side, index: usize) -> Self {
        assert!(x.is_finite(), "sweep event requires a finite x-coordinate");
        Event { x, ty, side, index }
    }
}

/// Equality check for usage in sorted sequences. Note that it only
/// compares the sweep position and the event type.
impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.ty == other.ty
    }
}

/// Assert total equality
impl Eq for Event {}

/// Ascending by `x`, then by event type. Events tied on both keep no
/// particular order; the sweep does not depend on it.
impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Derive `Ord` from the coordinate ordering; coordinates are finite.
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x
            .partial_cmp(&other.x)
            .expect("sweep events have finite coordinates")
            .then_with(|| self.ty.cmp(&other.ty))
    }
}
