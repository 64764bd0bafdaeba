//! Deterministic environment services
//!
//! [`ManualClock`] and [`ManualScheduler`] give tests (and replay tooling)
//! full control over time: the clock only moves when told to, and scheduled
//! wakes fire exactly at their due instants during [`ManualScheduler::advance`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use zeitnot_core::ClockInstant;

use crate::scheduler::{MonotonicClock, WakeCallback, WakeScheduler, WakeToken};

/// A clock that advances only on request.
pub struct ManualClock {
    now: Cell<ClockInstant>,
}

impl ManualClock {
    pub fn new() -> Rc<Self> {
        Rc::new(ManualClock {
            now: Cell::new(ClockInstant::EPOCH),
        })
    }

    /// Move the clock forward
    pub fn advance(&self, dt: Duration) {
        self.now.set(self.now.get() + dt);
    }

    /// Jump to an absolute instant. Must not move backwards.
    pub fn set(&self, instant: ClockInstant) {
        debug_assert!(instant >= self.now.get(), "manual clock must be monotonic");
        self.now.set(instant);
    }
}

impl MonotonicClock for ManualClock {
    fn now(&self) -> ClockInstant {
        self.now.get()
    }
}

struct PendingWake {
    token: WakeToken,
    due: ClockInstant,
    callback: WakeCallback,
}

/// A scheduler whose wakes fire only while the owning test drives it.
///
/// `advance` steps the attached [`ManualClock`] through each due instant in
/// order, firing wakes as it passes them, so a callback always observes a
/// clock at or past its own deadline.
pub struct ManualScheduler {
    clock: Rc<ManualClock>,
    pending: RefCell<Vec<PendingWake>>,
    next_token: Cell<u64>,
}

impl ManualScheduler {
    pub fn new(clock: Rc<ManualClock>) -> Rc<Self> {
        Rc::new(ManualScheduler {
            clock,
            pending: RefCell::new(Vec::new()),
            next_token: Cell::new(1),
        })
    }

    /// Number of wakes currently scheduled
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Is this token still scheduled?
    pub fn is_pending(&self, token: WakeToken) -> bool {
        self.pending.borrow().iter().any(|w| w.token == token)
    }

    /// Advance the clock by `dt`, firing every wake that falls due.
    pub fn advance(&self, dt: Duration) {
        let target = self.clock.now.get() + dt;
        loop {
            let next = {
                let pending = self.pending.borrow();
                pending
                    .iter()
                    .enumerate()
                    .filter(|(_, w)| w.due <= target)
                    .min_by_key(|(_, w)| (w.due, w.token.0))
                    .map(|(i, _)| i)
            };
            let Some(index) = next else { break };

            let wake = self.pending.borrow_mut().remove(index);
            if wake.due > self.clock.now.get() {
                self.clock.set(wake.due);
            }
            // The callback may schedule or cancel further wakes; no borrow
            // is held while it runs.
            (wake.callback)();
        }
        self.clock.set(target);
    }

    /// Fire wakes already due at the current clock, without moving it.
    pub fn fire_due(&self) {
        self.advance(Duration::ZERO);
    }
}

impl WakeScheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, callback: WakeCallback) -> WakeToken {
        let token = WakeToken(self.next_token.get());
        self.next_token.set(token.0 + 1);

        self.pending.borrow_mut().push(PendingWake {
            token,
            due: self.clock.now.get() + delay,
            callback,
        });
        token
    }

    fn cancel(&self, token: WakeToken) {
        // No-op when the token already fired or was cancelled
        self.pending.borrow_mut().retain(|w| w.token != token);
    }
}
