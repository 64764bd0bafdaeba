//! Zeitnot Test Harness - Deterministic drivers for the clock engine
//!
//! This crate provides:
//! - [`ClockBench`]: an engine wired to a manual clock and scheduler,
//!   with an event recorder attached
//! - Preset scenarios (bullet, blitz, classical)
//! - A seeded random-walk torture driver checking engine invariants

pub mod bench;
pub mod recorder;
pub mod torture;

pub use bench::*;
pub use recorder::*;
pub use torture::*;
