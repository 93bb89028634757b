//! Device communication
//!
//! A session talks to the plotter over a line transport: one newline-terminated
//! request, then exactly one newline-terminated answer. The TCP implementation
//! lives in [`tcp`]; the request/response state machine in [`session`]; the
//! background thread that owns a session in [`worker`].

pub mod session;
pub mod tcp;
pub mod worker;

use plotstream_core::{ConnectionError, SessionError};
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use session::{ControlCommand, ProtocolClient, SessionOptions, SessionOutcome};
pub use tcp::TcpTransport;
pub use worker::{SessionEvent, SessionHandle, SessionProgress, SessionSummary, Streamer};

/// Connection timeout used when none is configured (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 2500;

/// Default plotter host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default plotter port
pub const DEFAULT_PORT: u16 = 8888;

/// Line-oriented, blocking byte transport
pub trait LineTransport: Send {
    /// Write one complete, newline-terminated line and flush it
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Block for the next line, returned without its terminator
    ///
    /// `Ok(None)` means the peer closed the connection.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Peer description for log messages
    fn name(&self) -> String;

    /// Close the transport
    fn close(&mut self) -> io::Result<()>;
}

/// Where to find the plotter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Host name or IP address
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Connect timeout in milliseconds
    pub timeout_ms: u64,
}

impl ConnectionParams {
    /// Create parameters with the default timeout
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Override the connect timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// `host:port` form used for resolution and messages
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address())
    }
}

/// Parse a user-supplied port number
///
/// Accepts 1..=65535 after trimming whitespace.
pub fn parse_port(host: &str, text: &str) -> Result<u16, ConnectionError> {
    let invalid = |reason: &str| ConnectionError::InvalidAddress {
        address: format!("{}:{}", host, text.trim()),
        reason: reason.to_string(),
    };
    match text.trim().parse::<u16>() {
        Ok(0) => Err(invalid("port must be between 1 and 65535")),
        Ok(port) => Ok(port),
        Err(_) => Err(invalid("port must be a number between 1 and 65535")),
    }
}

/// Cooperative cancellation flag shared between the control thread and a worker
///
/// Setting it never interrupts an in-flight write or read; the session loop
/// looks at it before each data command.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Category of a reported session failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connect attempt did not finish in time
    Timeout,
    /// Host or port unusable
    InvalidAddress,
    /// The device refused the connection
    Refused,
    /// Unexpected acknowledgment
    ProtocolViolation,
    /// Transport failure mid-session
    Io,
}

impl From<&ConnectionError> for ErrorKind {
    fn from(error: &ConnectionError) -> Self {
        match error {
            ConnectionError::Timeout { .. } => ErrorKind::Timeout,
            ConnectionError::InvalidAddress { .. } => ErrorKind::InvalidAddress,
            ConnectionError::Refused { .. } => ErrorKind::Refused,
        }
    }
}

impl From<&SessionError> for ErrorKind {
    fn from(error: &SessionError) -> Self {
        match error {
            SessionError::ProtocolViolation { .. } => ErrorKind::ProtocolViolation,
            SessionError::Io(_) => ErrorKind::Io,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::InvalidAddress => "invalid address",
            ErrorKind::Refused => "connection refused",
            ErrorKind::ProtocolViolation => "protocol violation",
            ErrorKind::Io => "I/O error",
        };
        f.write_str(name)
    }
}

/// Observer of a streaming session
///
/// Called from the worker thread. Every method has an empty default.
pub trait SessionListener: Send + Sync {
    /// Connection state changed
    fn on_state_changed(&self, _state: plotstream_core::ConnectionState) {}

    /// `sent` of `total` data commands acknowledged
    fn on_progress(&self, _sent: usize, _total: usize) {}

    /// Human-readable status text
    fn on_message(&self, _message: &str) {}

    /// A failure ended the session or prevented it from starting
    fn on_error(&self, _kind: ErrorKind, _detail: &str) {}
}

/// Listener that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpListener;

impl SessionListener for NoOpListener {}
