//! Zeitnot Runtime - Tokio wiring for the clock engine
//!
//! The engine core is runtime-free; this crate supplies the two environment
//! services it needs from a tokio current-thread context:
//! - [`TokioScheduler`]: one-shot wakes as `spawn_local` tasks
//! - engine construction against [`SystemClock`]
//! - tracing-subscriber setup
//!
//! Everything here assumes a cooperative single-threaded loop (a
//! [`tokio::task::LocalSet`]); wakes run on the same thread as the engine,
//! so the engine's `Rc` state needs no locking.

pub mod scheduler;
pub mod telemetry;

pub use scheduler::*;
pub use telemetry::*;

use std::rc::Rc;

use zeitnot_clock::{ClockEngine, SystemClock};
use zeitnot_core::TimeControl;

/// Build an engine on the system clock and a tokio scheduler.
///
/// Must be driven from within a [`tokio::task::LocalSet`]; the first
/// mutation schedules a watchdog wake via `spawn_local`.
pub fn spawn_engine(control: TimeControl) -> ClockEngine {
    let clock = Rc::new(SystemClock::new());
    let scheduler = TokioScheduler::new();
    ClockEngine::new(control, clock, scheduler)
}
