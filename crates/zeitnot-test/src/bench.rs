//! Deterministic engine fixture

use std::rc::Rc;
use std::time::Duration;

use zeitnot_clock::{ClockEngine, ManualClock, ManualScheduler, MonotonicClock, WakeScheduler};
use zeitnot_core::TimeControl;

use crate::recorder::EventRecorder;

/// An engine wired to a manual clock and scheduler, with a recorder attached.
///
/// Time only moves through [`ClockBench::advance`], which also fires any
/// watchdog wakes falling due, exactly at their due instants.
pub struct ClockBench {
    pub clock: Rc<ManualClock>,
    pub scheduler: Rc<ManualScheduler>,
    pub engine: ClockEngine,
    pub recorder: EventRecorder,
}

impl ClockBench {
    pub fn new(control: TimeControl) -> Self {
        let clock = ManualClock::new();
        let scheduler = ManualScheduler::new(Rc::clone(&clock));
        let engine = ClockEngine::new(
            control,
            Rc::clone(&clock) as Rc<dyn MonotonicClock>,
            Rc::clone(&scheduler) as Rc<dyn WakeScheduler>,
        );

        let recorder = EventRecorder::new();
        recorder.attach(&engine);

        ClockBench {
            clock,
            scheduler,
            engine,
            recorder,
        }
    }

    /// Move time forward, firing due wakes along the way
    pub fn advance(&self, dt: Duration) {
        self.scheduler.advance(dt);
    }

    /// Let `dt` of thinking time pass, then complete the ply
    pub fn tap_after(&self, dt: Duration) {
        self.advance(dt);
        self.engine.tap();
    }

    /// Play the two opening plies back-to-back so the countdown is live
    pub fn open(&self) {
        self.engine.tap();
        self.engine.tap();
    }
}

/// Preset fixtures
pub mod scenarios {
    use super::*;

    /// 1 minute, 5 second gain
    pub fn bullet() -> ClockBench {
        ClockBench::new(TimeControl::new(60.0, 5.0).expect("valid control"))
    }

    /// 5 minutes, no gain
    pub fn blitz() -> ClockBench {
        ClockBench::new(TimeControl::new(300.0, 0.0).expect("valid control"))
    }

    /// 90 minutes, 30 second gain
    pub fn classical() -> ClockBench {
        ClockBench::new(TimeControl::new(5400.0, 30.0).expect("valid control"))
    }
}
