//! Per-color remaining-time history
//!
//! One entry per completed ply by that color, index 0 = the starting
//! allocation. Entries are never reordered; undo removes from the tail only.
//! INVARIANT: length >= 1 at all times.

use zeitnot_core::ClockTime;

/// Ordered history of recorded remaining-time values for one color.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeSeries {
    entries: Vec<ClockTime>,
}

impl TimeSeries {
    /// Start a series at its initial allocation
    pub fn new(initial: ClockTime) -> Self {
        TimeSeries {
            entries: vec![initial],
        }
    }

    /// Number of recorded entries (always >= 1)
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Starting allocation (index 0)
    #[inline]
    pub fn first(&self) -> ClockTime {
        self.entries[0]
    }

    /// Last recorded value
    #[inline]
    pub fn last(&self) -> ClockTime {
        *self.entries.last().expect("series is never empty")
    }

    /// Value at a given index, if recorded
    #[inline]
    pub fn get(&self, index: usize) -> Option<ClockTime> {
        self.entries.get(index).copied()
    }

    /// Record a completed ply
    pub fn push(&mut self, value: ClockTime) {
        self.entries.push(value);
    }

    /// Remove the most recent entry. Refuses to drop below length 1.
    pub fn pop(&mut self) -> Option<ClockTime> {
        if self.entries.len() > 1 {
            self.entries.pop()
        } else {
            None
        }
    }

    /// Overwrite the last recorded value (external override of a
    /// non-running clock)
    pub fn set_last(&mut self, value: ClockTime) {
        *self.entries.last_mut().expect("series is never empty") = value;
    }

    /// Iterate recorded values in ply order
    pub fn iter(&self) -> impl Iterator<Item = ClockTime> + '_ {
        self.entries.iter().copied()
    }
}
