//! The collaborator interface an exchange drives
//!
//! A transport supplies nonblocking primitives, each already normalized to
//! [`NonblockingResult`], plus a bounded readiness wait on its descriptor.
//! The exchange owns the retry loop and the budget; transports never loop on
//! would-block themselves.

use std::io;
use std::time::Duration;

use stint_core::{Interest, NonblockingResult, ReadinessOutcome};

/// One already-established, selectable, nonblocking connection
pub trait NonblockingStream {
    /// Read up to `buf.len()` bytes. An ambiguous zero-length read is `EndOfStream`.
    fn read_nonblock(&mut self, buf: &mut [u8]) -> io::Result<NonblockingResult<usize>>;

    /// Write some prefix of `data`; partial writes are `Success(n)`.
    fn write_nonblock(&mut self, data: &[u8]) -> io::Result<NonblockingResult<usize>>;

    /// Advance the secure-channel negotiation by one step.
    /// Plain streams have nothing to negotiate.
    fn handshake_step(&mut self) -> io::Result<NonblockingResult<()>> {
        Ok(NonblockingResult::Success(()))
    }

    /// Push out anything the transport buffered internally.
    fn flush_nonblock(&mut self) -> io::Result<NonblockingResult<()>> {
        Ok(NonblockingResult::Success(()))
    }

    /// Block until the descriptor is ready for `interest` or `timeout` elapses.
    fn wait_for(&self, interest: Interest, timeout: Duration) -> io::Result<ReadinessOutcome>;
}

/// Establishes a connection within a single bounded attempt
pub trait Connector {
    type Stream: NonblockingStream;

    /// Open a connection to `host:port`, giving up after `timeout`.
    /// The returned stream must already be in nonblocking mode.
    fn connect(&self, host: &str, port: u16, timeout: Duration) -> io::Result<Self::Stream>;
}
