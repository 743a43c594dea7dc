//! Exchange - one connection, one shared deadline
//!
//! # Flow
//! ```text
//! connect ──▶ connect_secure (optional) ──▶ read / write ... (caller order)
//!    │                 │                          │
//!    └─────────────────┴──────────┬───────────────┘
//!                                 ▼
//!                      DeadlineBudget (one total)
//! ```
//!
//! Every stage after connect runs the same loop:
//! reset checkpoint → attempt → on would-block wait up to the remaining
//! budget → charge → retry the same request. Success charges and returns,
//! end of stream returns without error, anything else propagates at once.

use std::io;

use bytes::{Bytes, BytesMut};

use stint_core::{
    ExchangeStage, Interest, NonblockingResult, ReadOutcome, StintError, StintResult,
    TimeoutConfig,
};
use stint_time::{Clock, DeadlineBudget, MonotonicClock};

use crate::{Connector, NonblockingStream};

/// A connection whose stages all draw on one deadline budget.
///
/// Single use: after `DeadlineExceeded` every further stage fails the same
/// way. Not meant for concurrent use; wrap it yourself if you must share it.
pub struct Exchange<S, C: Clock = MonotonicClock> {
    stream: Option<S>,
    budget: DeadlineBudget<C>,
}

impl<S: NonblockingStream> Exchange<S> {
    /// Budget = connect + read + write allowances, on the OS monotonic clock
    pub fn new(timeouts: &TimeoutConfig) -> StintResult<Self> {
        Ok(Self::with_budget(DeadlineBudget::new(timeouts.total()?)))
    }
}

impl<S: NonblockingStream, C: Clock> Exchange<S, C> {
    pub fn with_clock(timeouts: &TimeoutConfig, clock: C) -> StintResult<Self> {
        Ok(Self::with_budget(DeadlineBudget::with_clock(
            timeouts.total()?,
            clock,
        )))
    }

    pub fn with_budget(budget: DeadlineBudget<C>) -> Self {
        Exchange {
            stream: None,
            budget,
        }
    }

    /// Establish the transport connection.
    ///
    /// A single attempt bounded by everything that is left of the budget;
    /// the time it took is charged whether it succeeded or not.
    pub fn connect<K>(&mut self, connector: &K, host: &str, port: u16) -> StintResult<()>
    where
        K: Connector<Stream = S>,
    {
        let _span = tracing::debug_span!("exchange", stage = %ExchangeStage::Connecting).entered();
        self.budget.check()?;

        self.budget.reset_checkpoint();
        let result = connector.connect(host, port, self.budget.remaining());
        self.budget.charge_elapsed()?;

        self.stream = Some(result?);
        tracing::debug!(host, port, time_left = ?self.budget.remaining(), "connected");
        Ok(())
    }

    /// Drive the secure-channel handshake to completion.
    pub fn connect_secure(&mut self) -> StintResult<()> {
        let (stream, budget) = self.parts()?;
        match drive(stream, budget, ExchangeStage::Handshaking, |s| s.handshake_step())? {
            ReadOutcome::Data(()) => Ok(()),
            ReadOutcome::EndOfStream => Err(StintError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "peer closed during handshake",
            ))),
        }
    }

    /// Read at most `size` bytes.
    pub fn read(&mut self, size: usize) -> StintResult<ReadOutcome<Bytes>> {
        let mut buf = BytesMut::zeroed(size);
        Ok(match self.read_into(&mut buf)? {
            ReadOutcome::Data(n) => {
                buf.truncate(n);
                ReadOutcome::Data(buf.freeze())
            }
            ReadOutcome::EndOfStream => ReadOutcome::EndOfStream,
        })
    }

    /// Read into `buf`; every retry asks for the whole of `buf` again.
    pub fn read_into(&mut self, buf: &mut [u8]) -> StintResult<ReadOutcome<usize>> {
        let (stream, budget) = self.parts()?;
        drive(stream, budget, ExchangeStage::Reading, |s| s.read_nonblock(&mut *buf))
    }

    /// Write some prefix of `data` and return how much went out.
    ///
    /// A partial count is a success; re-invoke for the rest. A peer that
    /// has closed yields `Ok(0)`.
    pub fn write(&mut self, data: &[u8]) -> StintResult<usize> {
        let (stream, budget) = self.parts()?;
        match drive(stream, budget, ExchangeStage::Writing, |s| s.write_nonblock(data))? {
            ReadOutcome::Data(n) => Ok(n),
            ReadOutcome::EndOfStream => Ok(0),
        }
    }

    /// Write all of `data`, every chunk drawing on the same budget.
    pub fn write_all(&mut self, mut data: &[u8]) -> StintResult<()> {
        while !data.is_empty() {
            match self.write(data)? {
                0 => {
                    return Err(StintError::Io(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "peer stopped accepting data",
                    )))
                }
                n => data = &data[n..],
            }
        }
        Ok(())
    }

    /// Push out anything the transport still holds.
    pub fn flush(&mut self) -> StintResult<()> {
        let (stream, budget) = self.parts()?;
        drive(stream, budget, ExchangeStage::Writing, |s| s.flush_nonblock())?;
        Ok(())
    }

    pub fn time_left(&self) -> std::time::Duration {
        self.budget.remaining()
    }

    pub fn total_timeout(&self) -> std::time::Duration {
        self.budget.total()
    }

    pub fn budget(&self) -> &DeadlineBudget<C> {
        &self.budget
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub fn get_ref(&self) -> Option<&S> {
        self.stream.as_ref()
    }

    pub fn into_inner(self) -> Option<S> {
        self.stream
    }

    fn parts(&mut self) -> StintResult<(&mut S, &mut DeadlineBudget<C>)> {
        match self.stream.as_mut() {
            Some(stream) => Ok((stream, &mut self.budget)),
            None => Err(StintError::NotConnected),
        }
    }
}

/// The retry loop shared by handshake, read, write and flush.
fn drive<S, C, T, F>(
    stream: &mut S,
    budget: &mut DeadlineBudget<C>,
    stage: ExchangeStage,
    mut attempt: F,
) -> StintResult<ReadOutcome<T>>
where
    S: NonblockingStream,
    C: Clock,
    F: FnMut(&mut S) -> io::Result<NonblockingResult<T>>,
{
    let _span = tracing::debug_span!("exchange", %stage).entered();
    budget.check()?;

    budget.reset_checkpoint();
    loop {
        let interest = match attempt(&mut *stream)? {
            NonblockingResult::Success(value) => {
                budget.charge_elapsed()?;
                return Ok(ReadOutcome::Data(value));
            }
            NonblockingResult::EndOfStream => {
                tracing::debug!("end of stream");
                return Ok(ReadOutcome::EndOfStream);
            }
            NonblockingResult::WouldBlockRead => Interest::Read,
            NonblockingResult::WouldBlockWrite => Interest::Write,
        };

        let outcome = stream.wait_for(interest, budget.remaining())?;
        tracing::trace!(?interest, ?outcome, "readiness wait returned");
        budget.charge_elapsed()?;
    }
}

impl<S: NonblockingStream, C: Clock> io::Read for Exchange<S, C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.read_into(buf)? {
            ReadOutcome::Data(n) => Ok(n),
            ReadOutcome::EndOfStream => Ok(0),
        }
    }
}

impl<S: NonblockingStream, C: Clock> io::Write for Exchange<S, C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(Exchange::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(Exchange::flush(self)?)
    }
}
