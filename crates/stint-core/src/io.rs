//! Nonblocking I/O vocabulary
//!
//! Every raw nonblocking call (connect, handshake step, read, write) is
//! normalized into a [`NonblockingResult`] before the retry loop looks at it.
//! Platform signatures differ; the loop only ever sees these four shapes.

use std::fmt;
use std::io;

/// Readiness a descriptor is waited on for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Interest {
    Read,
    Write,
}

/// Result of a bounded readiness wait
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReadinessOutcome {
    /// Descriptor became ready for the requested interest
    Ready,
    /// The wait duration elapsed first
    TimedOut,
}

impl ReadinessOutcome {
    pub fn is_ready(self) -> bool {
        self == ReadinessOutcome::Ready
    }
}

/// Normalized result of one nonblocking attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NonblockingResult<T> {
    /// The attempt completed and produced a value
    Success(T),
    /// Cannot make progress until the descriptor is readable
    WouldBlockRead,
    /// Cannot make progress until the descriptor is writable
    WouldBlockWrite,
    /// Peer closed the stream
    EndOfStream,
}

impl<T> NonblockingResult<T> {
    /// Classify a raw `io::Result`.
    ///
    /// `WouldBlock` becomes the would-block variant for `blocked_on`; every
    /// other error is returned unchanged for the caller to propagate.
    pub fn from_io(result: io::Result<T>, blocked_on: Interest) -> io::Result<Self> {
        match result {
            Ok(value) => Ok(NonblockingResult::Success(value)),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(Self::would_block(blocked_on)),
            Err(e) => Err(e),
        }
    }

    pub fn would_block(interest: Interest) -> Self {
        match interest {
            Interest::Read => NonblockingResult::WouldBlockRead,
            Interest::Write => NonblockingResult::WouldBlockWrite,
        }
    }

    /// The interest to wait on, if this is a would-block signal.
    pub fn blocked_on(&self) -> Option<Interest> {
        match self {
            NonblockingResult::WouldBlockRead => Some(Interest::Read),
            NonblockingResult::WouldBlockWrite => Some(Interest::Write),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> NonblockingResult<U> {
        match self {
            NonblockingResult::Success(value) => NonblockingResult::Success(f(value)),
            NonblockingResult::WouldBlockRead => NonblockingResult::WouldBlockRead,
            NonblockingResult::WouldBlockWrite => NonblockingResult::WouldBlockWrite,
            NonblockingResult::EndOfStream => NonblockingResult::EndOfStream,
        }
    }
}

/// Stage of an exchange. Only used to pick the primitive and label diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangeStage {
    Connecting,
    Handshaking,
    Reading,
    Writing,
}

impl fmt::Display for ExchangeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExchangeStage::Connecting => "connect",
            ExchangeStage::Handshaking => "handshake",
            ExchangeStage::Reading => "read",
            ExchangeStage::Writing => "write",
        };
        f.write_str(name)
    }
}

/// What a read stage hands back: data, or the peer's end of stream.
///
/// End of stream is a normal outcome, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadOutcome<T> {
    Data(T),
    EndOfStream,
}

impl<T> ReadOutcome<T> {
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, ReadOutcome::EndOfStream)
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            ReadOutcome::Data(value) => Some(value),
            ReadOutcome::EndOfStream => None,
        }
    }
}
