//! TCP transport
//!
//! Blocking socket owned by the streaming worker. Connecting is bounded by the
//! configured timeout; reads and writes block without a timeout, since the
//! device acknowledges each command only after executing it.

use super::{ConnectionParams, LineTransport};
use plotstream_core::ConnectionError;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Line transport over a TCP connection
#[derive(Debug)]
pub struct TcpTransport {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    peer: String,
}

impl TcpTransport {
    /// Open a connection to the plotter
    ///
    /// Tries every resolved address in turn and reports the last failure.
    pub fn connect(params: &ConnectionParams) -> Result<Self, ConnectionError> {
        let address = params.address();
        let invalid = |reason: String| ConnectionError::InvalidAddress {
            address: address.clone(),
            reason,
        };

        if params.host.trim().is_empty() {
            return Err(invalid("host is empty".to_string()));
        }
        if params.port == 0 {
            return Err(invalid("port must be between 1 and 65535".to_string()));
        }

        let candidates: Vec<SocketAddr> = (params.host.as_str(), params.port)
            .to_socket_addrs()
            .map_err(|e| invalid(e.to_string()))?
            .collect();
        if candidates.is_empty() {
            return Err(invalid("host did not resolve to any address".to_string()));
        }

        let timeout = Duration::from_millis(params.timeout_ms.max(1));
        tracing::info!("Connecting to {} (timeout {}ms)", address, params.timeout_ms);

        let mut last_error = None;
        for candidate in candidates {
            match TcpStream::connect_timeout(&candidate, timeout) {
                Ok(stream) => {
                    return Self::from_stream(stream, address.clone()).map_err(|e| {
                        ConnectionError::Refused {
                            address: address.clone(),
                            reason: e.to_string(),
                        }
                    });
                }
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", candidate, e);
                    last_error = Some(e);
                }
            }
        }

        let error = match last_error {
            Some(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                ConnectionError::Timeout {
                    address,
                    timeout_ms: params.timeout_ms,
                }
            }
            Some(e) => ConnectionError::Refused {
                address,
                reason: e.to_string(),
            },
            None => ConnectionError::Refused {
                address,
                reason: "no address could be reached".to_string(),
            },
        };
        tracing::warn!("{}", error);
        Err(error)
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream, peer: impl Into<String>) -> io::Result<Self> {
        stream.set_nodelay(true)?;
        let writer = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(stream),
            writer,
            peer: peer.into(),
        })
    }
}

impl LineTransport for TcpTransport {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        if self.reader.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        let trimmed = buf.trim_end_matches(['\r', '\n']).len();
        buf.truncate(trimmed);
        Ok(Some(buf))
    }

    fn name(&self) -> String {
        self.peer.clone()
    }

    fn close(&mut self) -> io::Result<()> {
        tracing::info!("Closing connection to {}", self.peer);
        match self.writer.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(e),
            _ => Ok(()),
        }
    }
}
