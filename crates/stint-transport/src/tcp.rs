//! TCP transport: bounded connect plus nonblocking primitives over `std::net::TcpStream`

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::os::fd::AsFd;
use std::time::{Duration, Instant};

use stint_core::{Interest, NonblockingResult, ReadinessOutcome};

use crate::{wait_for, Connector, NonblockingStream};

/// Opens nonblocking TCP connections
#[derive(Clone, Debug)]
pub struct TcpConnector {
    nodelay: bool,
}

impl TcpConnector {
    pub fn new() -> Self {
        TcpConnector { nodelay: true }
    }

    /// Toggle `TCP_NODELAY` on connected streams (on by default)
    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }

    /// Connect to one of `addrs`, trying each in order until `timeout` runs out.
    pub fn connect_addrs(&self, addrs: &[SocketAddr], timeout: Duration) -> io::Result<TcpStream> {
        let deadline = Instant::now().checked_add(timeout);
        let mut last_err = None;

        for addr in addrs {
            let left = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => timeout,
            };
            if left.is_zero() {
                break;
            }

            match TcpStream::connect_timeout(addr, left) {
                Ok(stream) => {
                    stream.set_nonblocking(true)?;
                    stream.set_nodelay(self.nodelay)?;
                    tracing::debug!(%addr, "tcp connected");
                    return Ok(stream);
                }
                Err(e) => {
                    tracing::debug!(%addr, error = %e, "tcp connect attempt failed");
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            if addrs.is_empty() {
                io::Error::new(io::ErrorKind::InvalidInput, "no addresses to connect to")
            } else {
                io::Error::new(io::ErrorKind::TimedOut, "connect timed out")
            }
        }))
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(&self, host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
        let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
        self.connect_addrs(&addrs, timeout)
    }
}

impl NonblockingStream for TcpStream {
    fn read_nonblock(&mut self, buf: &mut [u8]) -> io::Result<NonblockingResult<usize>> {
        loop {
            match self.read(buf) {
                // TCP cannot tell an empty request apart from EOF
                Ok(0) => return Ok(NonblockingResult::EndOfStream),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                result => return NonblockingResult::from_io(result, Interest::Read),
            }
        }
    }

    fn write_nonblock(&mut self, data: &[u8]) -> io::Result<NonblockingResult<usize>> {
        loop {
            match self.write(data) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                result => return NonblockingResult::from_io(result, Interest::Write),
            }
        }
    }

    fn wait_for(&self, interest: Interest, timeout: Duration) -> io::Result<ReadinessOutcome> {
        wait_for(self.as_fd(), interest, timeout)
    }
}
