//! Time primitives for the clock engine
//!
//! The engine works on two signed microsecond scales:
//! - [`ClockTime`]: an amount of thinking time (remaining, elapsed, gained).
//!   Signed because a remaining value may dip below zero between real
//!   expiration and the watchdog announcing it.
//! - [`ClockInstant`]: a point on the engine's monotonic timeline. Signed
//!   because external overrides may rewrite a countdown origin to before the
//!   engine epoch.

use std::ops::{Add, Neg, Sub};
use std::time::Duration;

/// An amount of clock time, in signed microseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ClockTime(pub i64);

impl ClockTime {
    pub const ZERO: ClockTime = ClockTime(0);

    #[inline]
    pub fn from_micros(micros: i64) -> Self {
        ClockTime(micros)
    }

    #[inline]
    pub fn from_millis(millis: i64) -> Self {
        ClockTime(millis * 1000)
    }

    #[inline]
    pub fn from_secs(secs: i64) -> Self {
        ClockTime(secs * 1_000_000)
    }

    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        ClockTime((secs * 1_000_000.0) as i64)
    }

    #[inline]
    pub fn as_micros(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn as_millis(self) -> i64 {
        self.0 / 1000
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// A remaining value at or below zero means the flag has fallen.
    #[inline]
    pub fn is_expired(self) -> bool {
        self.0 <= 0
    }

    #[inline]
    pub fn abs(self) -> ClockTime {
        ClockTime(self.0.abs())
    }

    #[inline]
    pub fn saturating_add(self, rhs: ClockTime) -> ClockTime {
        ClockTime(self.0.saturating_add(rhs.0))
    }

    #[inline]
    pub fn saturating_sub(self, rhs: ClockTime) -> ClockTime {
        ClockTime(self.0.saturating_sub(rhs.0))
    }

    /// Clamped conversion to an unsigned [`Duration`] (negative becomes zero).
    #[inline]
    pub fn to_duration(self) -> Duration {
        Duration::from_micros(self.0.max(0) as u64)
    }
}

impl From<Duration> for ClockTime {
    #[inline]
    fn from(d: Duration) -> Self {
        ClockTime(d.as_micros() as i64)
    }
}

impl Add for ClockTime {
    type Output = ClockTime;

    #[inline]
    fn add(self, rhs: ClockTime) -> ClockTime {
        ClockTime(self.0 + rhs.0)
    }
}

impl Sub for ClockTime {
    type Output = ClockTime;

    #[inline]
    fn sub(self, rhs: ClockTime) -> ClockTime {
        ClockTime(self.0 - rhs.0)
    }
}

impl Neg for ClockTime {
    type Output = ClockTime;

    #[inline]
    fn neg(self) -> ClockTime {
        ClockTime(-self.0)
    }
}

impl std::fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:+.3}s", self.as_secs_f64())
    }
}

/// A point on the engine's monotonic timeline, in signed microseconds
/// since the engine epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ClockInstant(pub i64);

impl ClockInstant {
    pub const EPOCH: ClockInstant = ClockInstant(0);

    #[inline]
    pub fn from_micros(micros: i64) -> Self {
        ClockInstant(micros)
    }

    #[inline]
    pub fn as_micros(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Absolute distance between two instants
    #[inline]
    pub fn abs_diff(self, other: ClockInstant) -> ClockTime {
        ClockTime((self.0 - other.0).abs())
    }
}

impl Add<ClockTime> for ClockInstant {
    type Output = ClockInstant;

    #[inline]
    fn add(self, rhs: ClockTime) -> ClockInstant {
        ClockInstant(self.0 + rhs.0)
    }
}

impl Sub<ClockTime> for ClockInstant {
    type Output = ClockInstant;

    #[inline]
    fn sub(self, rhs: ClockTime) -> ClockInstant {
        ClockInstant(self.0 - rhs.0)
    }
}

impl Add<Duration> for ClockInstant {
    type Output = ClockInstant;

    #[inline]
    fn add(self, rhs: Duration) -> ClockInstant {
        ClockInstant(self.0 + rhs.as_micros() as i64)
    }
}

impl Sub<ClockInstant> for ClockInstant {
    type Output = ClockTime;

    /// Signed elapsed time from `rhs` to `self`
    #[inline]
    fn sub(self, rhs: ClockInstant) -> ClockTime {
        ClockTime(self.0 - rhs.0)
    }
}

impl std::fmt::Debug for ClockInstant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{:.3}s", self.as_secs_f64())
    }
}
