//! stint Transport - deadline-bounded socket exchanges
//!
//! This crate provides:
//! - A bounded single-descriptor readiness wait (poll)
//! - The nonblocking stream / connector interface
//! - TCP and TLS (rustls) collaborators
//! - Exchange: connect, TLS handshake, read and write sharing one budget

#[cfg(not(unix))]
compile_error!("stint-transport waits on raw descriptors and requires a unix target");

pub mod exchange;
pub mod readiness;
pub mod stream;
pub mod tcp;
pub mod tls;

pub use exchange::*;
pub use readiness::*;
pub use stream::*;
pub use tcp::*;
pub use tls::{TlsConnector, TlsStream};

pub use stint_core::{
    ExchangeStage, Interest, NonblockingResult, ReadOutcome, ReadinessOutcome, StintError,
    StintResult, TimeoutConfig,
};
pub use stint_time::{Clock, DeadlineBudget, ManualClock, MonotonicClock};
