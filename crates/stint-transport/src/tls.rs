//! TLS transport over a nonblocking TCP stream (rustls)
//!
//! The connector only opens TCP and prepares the client session. The
//! handshake itself is driven later, one nonblocking step at a time, by
//! `Exchange::connect_secure`.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::os::fd::AsFd;
use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection};

use stint_core::{Interest, NonblockingResult, ReadinessOutcome};

use crate::{wait_for, Connector, NonblockingStream, TcpConnector};

/// Opens TCP connections wrapped in a not-yet-negotiated TLS client session
#[derive(Clone)]
pub struct TlsConnector {
    config: Arc<ClientConfig>,
    tcp: TcpConnector,
}

impl TlsConnector {
    pub fn new(config: Arc<ClientConfig>) -> Self {
        TlsConnector {
            config,
            tcp: TcpConnector::new(),
        }
    }

    /// Use a differently configured TCP connector underneath
    pub fn with_tcp(mut self, tcp: TcpConnector) -> Self {
        self.tcp = tcp;
        self
    }
}

impl Connector for TlsConnector {
    type Stream = TlsStream;

    fn connect(&self, host: &str, port: u16, timeout: Duration) -> io::Result<TlsStream> {
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let conn = ClientConnection::new(Arc::clone(&self.config), server_name).map_err(tls_error)?;
        let sock = self.tcp.connect(host, port, timeout)?;
        Ok(TlsStream { conn, sock })
    }
}

/// TLS client session plus its socket
pub struct TlsStream {
    conn: ClientConnection,
    sock: TcpStream,
}

impl TlsStream {
    /// Wrap an already-connected nonblocking socket
    pub fn new(conn: ClientConnection, sock: TcpStream) -> Self {
        TlsStream { conn, sock }
    }

    pub fn is_handshaking(&self) -> bool {
        self.conn.is_handshaking()
    }

    pub fn connection(&self) -> &ClientConnection {
        &self.conn
    }

    pub fn socket(&self) -> &TcpStream {
        &self.sock
    }

    /// Send queued TLS records. `Some(interest)` when the socket would block.
    fn write_pending(&mut self) -> io::Result<Option<Interest>> {
        while self.conn.wants_write() {
            match self.conn.write_tls(&mut self.sock) {
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(Some(Interest::Write)),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Pull TLS records off the socket and process them.
    fn read_records(&mut self) -> io::Result<Option<Interest>> {
        match self.conn.read_tls(&mut self.sock) {
            Ok(_) => {
                if let Err(e) = self.conn.process_new_packets() {
                    // Best effort: let the peer see our alert
                    let _ = self.conn.write_tls(&mut self.sock);
                    return Err(tls_error(e));
                }
                Ok(None)
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(Some(Interest::Read)),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl NonblockingStream for TlsStream {
    fn read_nonblock(&mut self, buf: &mut [u8]) -> io::Result<NonblockingResult<usize>> {
        loop {
            match self.conn.reader().read(buf) {
                // close_notify received, or an empty request
                Ok(0) => return Ok(NonblockingResult::EndOfStream),
                Ok(n) => return Ok(NonblockingResult::Success(n)),
                // peer closed the socket without close_notify
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    return Ok(NonblockingResult::EndOfStream)
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
                Err(e) => return Err(e),
            }

            if let Some(interest) = self.write_pending()? {
                return Ok(NonblockingResult::would_block(interest));
            }
            if let Some(interest) = self.read_records()? {
                return Ok(NonblockingResult::would_block(interest));
            }
        }
    }

    fn write_nonblock(&mut self, data: &[u8]) -> io::Result<NonblockingResult<usize>> {
        if let Some(interest) = self.write_pending()? {
            return Ok(NonblockingResult::would_block(interest));
        }

        let n = self.conn.writer().write(data)?;
        if n == 0 && !data.is_empty() {
            return Ok(NonblockingResult::WouldBlockWrite);
        }

        // Ciphertext that does not fit now stays queued for the next call or flush
        self.write_pending()?;
        Ok(NonblockingResult::Success(n))
    }

    fn handshake_step(&mut self) -> io::Result<NonblockingResult<()>> {
        while self.conn.is_handshaking() {
            if let Some(interest) = self.write_pending()? {
                return Ok(NonblockingResult::would_block(interest));
            }
            if !self.conn.is_handshaking() {
                break;
            }
            if self.conn.wants_read() {
                match self.conn.read_tls(&mut self.sock) {
                    Ok(0) => {
                        return Err(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "peer closed during TLS handshake",
                        ))
                    }
                    Ok(_) => {
                        if let Err(e) = self.conn.process_new_packets() {
                            let _ = self.conn.write_tls(&mut self.sock);
                            return Err(tls_error(e));
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                        return Ok(NonblockingResult::WouldBlockRead)
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(e) => return Err(e),
                }
            } else {
                return Ok(NonblockingResult::WouldBlockRead);
            }
        }

        // Final flight (e.g. client Finished) may still be queued
        if let Some(interest) = self.write_pending()? {
            return Ok(NonblockingResult::would_block(interest));
        }
        Ok(NonblockingResult::Success(()))
    }

    fn flush_nonblock(&mut self) -> io::Result<NonblockingResult<()>> {
        match self.write_pending()? {
            Some(interest) => Ok(NonblockingResult::would_block(interest)),
            None => Ok(NonblockingResult::Success(())),
        }
    }

    fn wait_for(&self, interest: Interest, timeout: Duration) -> io::Result<ReadinessOutcome> {
        wait_for(self.sock.as_fd(), interest, timeout)
    }
}

fn tls_error(err: rustls::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}
