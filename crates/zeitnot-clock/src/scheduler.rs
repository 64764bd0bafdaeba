//! Environment services consumed by the engine
//!
//! The engine depends on exactly two abstract services:
//! - a monotonic time source ([`MonotonicClock`])
//! - a one-shot deferred-callback scheduler ([`WakeScheduler`])
//!
//! Both are object-safe so the engine can hold them as `Rc<dyn _>`. The
//! scheduler contract is cooperative: the callback runs on the same logical
//! thread that drives the engine, never concurrently with it.

use std::time::{Duration, Instant};

use zeitnot_core::ClockInstant;

/// Monotonic wall-clock source.
pub trait MonotonicClock {
    /// Current instant on the engine timeline. Must never go backwards.
    fn now(&self) -> ClockInstant;
}

/// Opaque handle identifying a scheduled wake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WakeToken(pub u64);

/// Deferred callback passed to [`WakeScheduler::schedule`].
pub type WakeCallback = Box<dyn FnOnce()>;

/// One-shot deferred-callback scheduler.
///
/// Contract:
/// - the callback runs once, after at least `delay` has elapsed, on the
///   engine's thread;
/// - [`cancel`](WakeScheduler::cancel) of a fired or unknown token is a
///   no-op, never an error;
/// - a cancelled wake must never invoke its callback.
pub trait WakeScheduler {
    fn schedule(&self, delay: Duration, callback: WakeCallback) -> WakeToken;
    fn cancel(&self, token: WakeToken);
}

/// Monotonic clock backed by [`std::time::Instant`], epoch at construction.
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now(&self) -> ClockInstant {
        ClockInstant::from_micros(self.epoch.elapsed().as_micros() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemClock::new();
        let t1 = clock.now();
        let t2 = clock.now();
        assert!(t2 >= t1);
        assert!(t1 >= ClockInstant::EPOCH);
    }
}
