//! Zero-expiration watchdog bookkeeping
//!
//! The watchdog projects an expiration deadline for both colors after every
//! mutation and keeps at most one wake scheduled. Only the true mover's
//! projection decreases with real time; the non-mover's stored value is
//! frozen, so its projection is constant. Projecting both anyway makes the
//! scheme self-correcting around color-switch boundaries, and every recompute
//! supersedes whatever was scheduled before.

use std::time::Duration;

use zeitnot_core::{ClockInstant, ClockTime, Color};

use crate::scheduler::WakeToken;
use crate::state::ClockState;

/// Guard added past the projected deadline so the wake never lands strictly
/// before real expiration due to scheduler granularity.
pub const ZERO_GUARD: Duration = Duration::from_millis(20);

/// A recomputed deadline within this distance of the scheduled one keeps the
/// pending wake instead of rescheduling.
pub const RESCHEDULE_EPSILON: ClockTime = ClockTime(5_000);

/// The currently scheduled wake. At most one is live per engine; superseded
/// watches are cancelled before a replacement is scheduled.
#[derive(Debug)]
pub(crate) struct ZeroWatch {
    pub token: WakeToken,
    pub due: ClockInstant,
    pub color: Color,
    /// Stamp checked at fire time; a stale generation is a silent no-op.
    pub generation: u64,
}

/// Projected expiration instant: argmin over both colors of
/// `now + remaining(color)`, ties to White.
///
/// Returns `None` when the nearest projection is already due. Expired time
/// never re-arms by itself; only a state change restoring positive remaining
/// time does, which keeps `ZeroReached` at most-once per expiry.
pub(crate) fn next_deadline(state: &ClockState, now: ClockInstant) -> Option<(Color, ClockInstant)> {
    let white = state.remaining(Color::White, now);
    let black = state.remaining(Color::Black, now);

    let (color, remaining) = if white <= black {
        (Color::White, white)
    } else {
        (Color::Black, black)
    };

    if remaining.is_expired() {
        None
    } else {
        Some((color, now + remaining))
    }
}
