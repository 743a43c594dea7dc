//! stint Core - Fundamental types shared by every crate in the workspace
//!
//! This crate defines:
//! - Readiness interest and outcomes (Interest, ReadinessOutcome)
//! - The normalized nonblocking result (NonblockingResult)
//! - Exchange stages and read outcomes
//! - Error types (StintError)
//! - Per-stage timeout allowances (TimeoutConfig)

pub mod config;
pub mod error;
pub mod io;

pub use config::*;
pub use error::*;
pub use io::*;
