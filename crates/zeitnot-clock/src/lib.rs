//! Zeitnot Clock - The time-control engine
//!
//! This crate implements the clock proper:
//! - Per-color remaining-time series (one entry per completed ply)
//! - Tap/start/pause/resume/undo transition logic with Fischer increment
//!   and the FICS delayed-start rule
//! - The zero-expiration watchdog (predict, schedule, verify)
//! - Synchronous listener dispatch
//!
//! The engine is a leaf: it consumes a [`MonotonicClock`] and a
//! [`WakeScheduler`] supplied by its environment and nothing else.
//! `zeitnot-runtime` provides tokio-backed implementations; the [`manual`]
//! module provides deterministic ones for tests and replay.

pub mod engine;
pub mod manual;
pub mod scheduler;
pub mod series;
pub mod state;
pub mod watchdog;

pub use engine::*;
pub use manual::*;
pub use scheduler::*;
pub use series::*;
pub use state::*;
