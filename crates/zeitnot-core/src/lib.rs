//! Zeitnot Core - Fundamental types for the time-control engine
//!
//! This crate defines the core types shared across the workspace:
//! - Player colors
//! - Time primitives (ClockTime, ClockInstant)
//! - Time-control configuration
//! - Engine notifications
//! - Error taxonomy

pub mod color;
pub mod config;
pub mod error;
pub mod event;
pub mod time;

pub use color::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use time::*;
