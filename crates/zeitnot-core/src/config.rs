//! Time-control configuration
//!
//! A [`TimeControl`] is immutable once built: the engine copies it at
//! creation and never mutates it. Validation happens here, fail-fast,
//! so the engine can assume well-formed inputs.

use std::fmt;

use crate::{ClockError, ClockResult, ClockTime};

/// Immutable description of a game's time control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeControl {
    initial: ClockTime,
    black_initial: ClockTime,
    increment: ClockTime,
    nominal_minutes: u32,
}

impl TimeControl {
    /// Create a time control from base allocation and per-move gain,
    /// both in seconds.
    ///
    /// Black's allocation defaults to White's; the nominal minute count
    /// (display only) defaults to `initial / 60`.
    pub fn new(initial_secs: f64, increment_secs: f64) -> ClockResult<Self> {
        let initial = validate_secs(initial_secs)?;
        if initial_secs < 0.0 {
            return Err(ClockError::NegativeInitialTime(initial_secs));
        }
        if !increment_secs.is_finite() {
            return Err(ClockError::NonFiniteTime(increment_secs));
        }
        if increment_secs < 0.0 {
            return Err(ClockError::NegativeIncrement(increment_secs));
        }

        Ok(TimeControl {
            initial,
            black_initial: initial,
            increment: ClockTime::from_secs_f64(increment_secs),
            nominal_minutes: (initial_secs / 60.0) as u32,
        })
    }

    /// Convenience constructor: `minutes` base with `increment_secs` gain
    pub fn fischer(minutes: u32, increment_secs: f64) -> ClockResult<Self> {
        TimeControl::new(f64::from(minutes) * 60.0, increment_secs)
    }

    /// Override Black's base allocation (odds games, adjourned resumes)
    pub fn with_black_initial(mut self, secs: f64) -> ClockResult<Self> {
        let t = validate_secs(secs)?;
        if secs < 0.0 {
            return Err(ClockError::NegativeInitialTime(secs));
        }
        self.black_initial = t;
        Ok(self)
    }

    /// Override the displayed minute count (e.g. a game resumed mid-way
    /// keeps its original control's label).
    pub fn with_nominal_minutes(mut self, minutes: u32) -> Self {
        self.nominal_minutes = minutes;
        self
    }

    /// White's base allocation
    #[inline]
    pub fn initial(&self) -> ClockTime {
        self.initial
    }

    /// Black's base allocation
    #[inline]
    pub fn black_initial(&self) -> ClockTime {
        self.black_initial
    }

    /// Per-move gain
    #[inline]
    pub fn increment(&self) -> ClockTime {
        self.increment
    }

    /// Nominal minute count for display
    #[inline]
    pub fn nominal_minutes(&self) -> u32 {
        self.nominal_minutes
    }

    /// Human-readable summary, e.g. "5 min + 3 sec"
    pub fn display_text(&self) -> String {
        let mut text = format!("{} min", self.nominal_minutes);
        if self.increment != ClockTime::ZERO {
            text.push_str(&format!(" + {} sec", self.increment.as_micros() / 1_000_000));
        }
        text
    }
}

impl fmt::Display for TimeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

fn validate_secs(secs: f64) -> ClockResult<ClockTime> {
    if !secs.is_finite() {
        return Err(ClockError::NonFiniteTime(secs));
    }
    Ok(ClockTime::from_secs_f64(secs))
}
