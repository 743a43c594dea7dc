//! Error types for stint exchanges

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Core stint errors
#[derive(Error, Debug)]
pub enum StintError {
    /// The exchange used up its whole budget. Terminal: the exchange must be discarded.
    #[error("Timed out after using the allocated {total:?}")]
    DeadlineExceeded { total: Duration },

    // Transport errors are passed through untouched
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("Exchange is not connected")]
    NotConnected,

    // Configuration errors
    #[error("Invalid timeout configuration: {0}")]
    InvalidConfig(String),
}

impl StintError {
    /// True for the terminal budget-exhausted failure.
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, StintError::DeadlineExceeded { .. })
    }

    /// The original total budget carried by `DeadlineExceeded`.
    pub fn exhausted_total(&self) -> Option<Duration> {
        match self {
            StintError::DeadlineExceeded { total } => Some(*total),
            _ => None,
        }
    }
}

impl From<StintError> for io::Error {
    fn from(err: StintError) -> Self {
        match err {
            StintError::Io(e) => e,
            StintError::NotConnected => io::Error::new(io::ErrorKind::NotConnected, err),
            StintError::DeadlineExceeded { .. } => io::Error::new(io::ErrorKind::TimedOut, err),
            StintError::InvalidConfig(_) => io::Error::new(io::ErrorKind::InvalidInput, err),
        }
    }
}

/// Result type for stint operations
pub type StintResult<T> = Result<T, StintError>;
