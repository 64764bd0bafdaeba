//! Clock state and transition logic
//!
//! Pure state machine: every transition takes the current instant as an
//! argument and returns the notifications to dispatch. Watchdog scheduling
//! and listener dispatch are layered on top by the engine.

use zeitnot_core::{
    ClockError, ClockEvent, ClockInstant, ClockResult, ClockTime, Color, TimeControl,
};

use crate::series::TimeSeries;
use crate::watchdog::ZeroWatch;

/// Mutable clock state: both series plus the countdown bookkeeping.
///
/// Lifecycle: `NotStarted -> Running <-> Paused -> Ended`, with `Ended`
/// reachable from any state and irreversible. Under the FICS delayed-start
/// rule, `NotStarted` persists until both sides have completed a ply, even
/// though those plies are recorded.
pub struct ClockState {
    control: TimeControl,
    series: [TimeSeries; 2],
    moving: Color,
    started: bool,
    paused: bool,
    ended: bool,
    /// Instant the current ply's countdown began; `None` when not running
    counter_start: Option<ClockInstant>,
    /// Elapsed time on the active clock at the moment pause was engaged
    pause_elapsed: ClockTime,
    pub(crate) watch: Option<ZeroWatch>,
    generation: u64,
}

impl ClockState {
    pub fn new(control: TimeControl) -> Self {
        ClockState {
            control,
            series: [
                TimeSeries::new(control.initial()),
                TimeSeries::new(control.black_initial()),
            ],
            moving: Color::White,
            started: false,
            paused: false,
            ended: false,
            counter_start: None,
            pause_elapsed: ClockTime::ZERO,
            watch: None,
            generation: 0,
        }
    }

    // ── Transitions ────────────────────────────────────────────────────────

    /// The moving player completed a ply (already validated externally).
    pub fn tap(&mut self, now: ClockInstant) -> Vec<ClockEvent> {
        if self.paused || self.ended {
            return Vec::new();
        }

        let mover = self.moving;
        if self.started {
            let elapsed = match self.counter_start {
                Some(origin) => now - origin,
                None => ClockTime::ZERO,
            };
            let value = self.series[mover.index()].last() - elapsed + self.control.increment();
            self.series[mover.index()].push(value);
        } else {
            // No time consumed yet: carry the last value forward
            let carried = self.series[mover.index()].last();
            self.series[mover.index()].push(carried);
            // FICS rule: the countdown begins once both sides have moved
            if self.ply() >= 2 {
                self.started = true;
            }
        }

        self.moving = mover.opponent();

        let mut events = Vec::with_capacity(2);
        if self.started {
            self.counter_start = Some(now);
            events.push(ClockEvent::TimeChanged);
        }
        events.push(ClockEvent::PlayerChanged);
        events
    }

    /// Begin consuming real time immediately, bypassing the delayed-start
    /// rule. Idempotent.
    pub fn start(&mut self, now: ClockInstant) -> Vec<ClockEvent> {
        if self.started || self.ended {
            return Vec::new();
        }
        self.started = true;
        self.counter_start = Some(now);
        vec![ClockEvent::TimeChanged]
    }

    /// Freeze both clocks. Idempotent.
    pub fn pause(&mut self, now: ClockInstant) -> Vec<ClockEvent> {
        if self.paused {
            return Vec::new();
        }
        self.paused = true;

        if let Some(origin) = self.counter_start {
            self.pause_elapsed = now - origin;
        }
        self.counter_start = None;

        tracing::debug!(mover = %self.moving, "clock paused");
        vec![ClockEvent::TimeChanged, ClockEvent::PauseChanged(true)]
    }

    /// Resume after a pause, preserving the mover's elapsed time. Idempotent.
    pub fn resume(&mut self, now: ClockInstant) -> Vec<ClockEvent> {
        if !self.paused || self.ended {
            return Vec::new();
        }
        self.paused = false;
        self.counter_start = Some(now - self.pause_elapsed);

        tracing::debug!(mover = %self.moving, "clock resumed");
        vec![ClockEvent::PauseChanged(false)]
    }

    /// Freeze and make the clock permanently inert. Irreversible.
    pub fn end(&mut self, now: ClockInstant) -> Vec<ClockEvent> {
        if self.ended {
            return Vec::new();
        }
        let events = self.pause(now);
        self.ended = true;

        tracing::debug!(
            white = ?self.series[Color::White.index()].last(),
            black = ?self.series[Color::Black.index()].last(),
            "clock ended"
        );
        events
    }

    /// Rewind exactly `n` completed plies, all-or-nothing.
    ///
    /// Feasibility is validated before any mutation; on failure the state is
    /// untouched. After a successful undo the clock is running again when at
    /// least two plies remain recorded, otherwise it returns to NotStarted.
    pub fn undo_plies(&mut self, n: usize, now: ClockInstant) -> ClockResult<Vec<ClockEvent>> {
        if self.ended {
            return Ok(Vec::new());
        }

        // Removals alternate starting with the player who moved last
        let mut removals = [0usize; 2];
        let mut color = self.moving;
        for _ in 0..n {
            color = color.opponent();
            removals[color.index()] += 1;
        }
        for c in Color::BOTH {
            if self.series[c.index()].len() <= removals[c.index()] {
                return Err(ClockError::InvalidUndo {
                    requested: n,
                    available: self.ply(),
                });
            }
        }

        for _ in 0..n {
            self.moving = self.moving.opponent();
            let _ = self.series[self.moving.index()].pop();
        }

        if self.series[0].len() + self.series[1].len() >= 4 {
            self.started = true;
            self.counter_start = Some(now);
        } else {
            self.started = false;
            self.counter_start = None;
        }

        tracing::debug!(plies = n, mover = %self.moving, "undo applied");
        Ok(vec![ClockEvent::TimeChanged, ClockEvent::PlayerChanged])
    }

    /// External override of a player's remaining time (e.g. correcting drift
    /// from an authoritative server).
    ///
    /// For the active, running mover the countdown origin is rewritten so the
    /// live reading equals `value` at `now`; otherwise the stored tail value
    /// is overwritten directly.
    pub fn set_remaining(
        &mut self,
        color: Color,
        value: ClockTime,
        now: ClockInstant,
    ) -> Vec<ClockEvent> {
        if self.ended {
            return Vec::new();
        }

        if color == self.moving && self.started && !self.paused {
            self.counter_start = Some(now - (self.series[color.index()].last() - value));
        } else {
            self.series[color.index()].set_last(value);
        }
        vec![ClockEvent::TimeChanged]
    }

    /// External override of the mover (position setup)
    pub fn set_moving_color(&mut self, color: Color) -> Vec<ClockEvent> {
        if self.ended {
            return Vec::new();
        }
        self.moving = color;
        vec![ClockEvent::PlayerChanged]
    }

    // ── Queries ────────────────────────────────────────────────────────────

    /// Remaining time on a player's latest ply.
    ///
    /// Live for the active running mover, frozen for everyone else. May be
    /// transiently at or below zero between real expiration and the watchdog
    /// announcing it; observers must treat any expired value as a fallen flag.
    pub fn remaining(&self, color: Color, now: ClockInstant) -> ClockTime {
        let last = self.series[color.index()].last();
        if color == self.moving && self.started {
            if self.paused {
                return last - self.pause_elapsed;
            }
            if let Some(origin) = self.counter_start {
                return last - (now - origin);
            }
        }
        last
    }

    /// Raw recorded value at a historical ply index for that color
    pub fn remaining_at(&self, color: Color, index: usize) -> Option<ClockTime> {
        self.series[color.index()].get(index)
    }

    /// White's starting allocation
    pub fn initial_time(&self) -> ClockTime {
        self.series[Color::White.index()].first()
    }

    /// Wall-clock time a given 1-based ply consumed: the difference between
    /// consecutive series entries of its mover, plus the increment credited
    /// for plies beyond the second. The first move of each color, and any
    /// unrecorded ply, reports zero.
    pub fn elapsed_move_time(&self, ply: usize) -> ClockTime {
        if ply == 0 {
            return ClockTime::ZERO;
        }
        let color = Color::mover_of_ply(ply);
        let movecount = (ply + 1) / 2;
        if movecount < 2 {
            return ClockTime::ZERO;
        }
        let gain = if ply > 2 {
            self.control.increment()
        } else {
            ClockTime::ZERO
        };

        let series = &self.series[color.index()];
        match (series.get(movecount - 1), series.get(movecount)) {
            (Some(before), Some(after)) => before - after + gain,
            _ => ClockTime::ZERO,
        }
    }

    /// Completed plies since game start
    #[inline]
    pub fn ply(&self) -> usize {
        self.series[0].len() + self.series[1].len() - 2
    }

    /// Has any move time been recorded?
    pub fn has_times(&self) -> bool {
        self.series[Color::White.index()].len() > 1
    }

    /// Are at least `bcount` Black and `wcount` White plies recorded?
    pub fn has_bw_times(&self, bcount: usize, wcount: usize) -> bool {
        self.series[Color::Black.index()].len() > bcount
            && self.series[Color::White.index()].len() > wcount
    }

    #[inline]
    pub fn moving_color(&self) -> Color {
        self.moving
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.started
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    #[inline]
    pub fn control(&self) -> &TimeControl {
        &self.control
    }

    /// Full recorded history for one color
    pub fn series(&self, color: Color) -> &TimeSeries {
        &self.series[color.index()]
    }

    /// Fresh stamp for a scheduled wake
    pub(crate) fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}
