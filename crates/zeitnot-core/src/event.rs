//! Engine notifications
//!
//! The engine dispatches these synchronously, in-line with the mutation that
//! caused them: when a mutating call returns, every listener has already seen
//! the fully-updated state.

use crate::Color;

/// Notification raised by the clock engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClockEvent {
    /// The active mover changed
    PlayerChanged,
    /// A remaining-time value changed (tap, pause, resume, undo, override)
    TimeChanged,
    /// The clock was paused or resumed
    PauseChanged(bool),
    /// A player's remaining time reached zero.
    ///
    /// Raised at most once per expiry; the watchdog re-arms only after a
    /// state change restores positive time for that color.
    ZeroReached(Color),
}

/// Event classification, for kind-filtered subscriptions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Player,
    Time,
    Pause,
    Zero,
}

impl ClockEvent {
    #[inline]
    pub fn kind(self) -> EventKind {
        match self {
            ClockEvent::PlayerChanged => EventKind::Player,
            ClockEvent::TimeChanged => EventKind::Time,
            ClockEvent::PauseChanged(_) => EventKind::Pause,
            ClockEvent::ZeroReached(_) => EventKind::Zero,
        }
    }
}
