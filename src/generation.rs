//! Ping-pong slot selection.
//!
//! Two particle buffers swap source and destination roles every step. A
//! [`Generation`] is the handle that says which [`Slot`] is current; the
//! binding sets and buffers are indexed by it instead of being rebuilt per
//! frame.

/// Number of particle buffers in the ping-pong pair.
pub const SLOT_COUNT: usize = 2;

/// One of the two particle buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    /// Both slots in buffer order.
    pub const ALL: [Slot; SLOT_COUNT] = [Slot::A, Slot::B];

    /// Position of this slot in a `[T; SLOT_COUNT]` array.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The slot this one pairs with.
    #[inline]
    pub fn other(self) -> Slot {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }
}

/// Count of completed simulation steps.
///
/// Slot `generation % 2` holds the authoritative particles before the next
/// step; the step writes the other slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub const INITIAL: Generation = Generation(0);

    pub fn new(steps: u64) -> Self {
        Self(steps)
    }

    /// Steps completed so far.
    pub fn steps(self) -> u64 {
        self.0
    }

    /// Slot read by the next step (and its binding-set index).
    #[inline]
    pub fn source_slot(self) -> Slot {
        Slot::ALL[(self.0 % SLOT_COUNT as u64) as usize]
    }

    /// Slot written by the next step.
    #[inline]
    pub fn destination_slot(self) -> Slot {
        self.source_slot().other()
    }

    /// The generation after one more step.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}
