//! Error types for the clock engine

use thiserror::Error;

/// Clock engine errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClockError {
    // Configuration errors (fail fast at construction)
    #[error("Negative initial time: {0}s")]
    NegativeInitialTime(f64),

    #[error("Negative increment: {0}s")]
    NegativeIncrement(f64),

    #[error("Non-finite time value: {0}")]
    NonFiniteTime(f64),

    // Undo errors
    #[error("Cannot undo {requested} plies: only {available} recorded")]
    InvalidUndo { requested: usize, available: usize },
}

/// Result type for clock operations
pub type ClockResult<T> = Result<T, ClockError>;
