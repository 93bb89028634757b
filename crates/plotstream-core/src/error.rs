//! Error handling for Plotstream
//!
//! Provides error types for every layer of the sender:
//! - G-Code errors (parsing, arc expansion, reading the program file)
//! - Connection errors (the session never started)
//! - Session errors (a started streaming session was aborted)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// G-Code error type
///
/// Parse-time failures. Any of these aborts the whole file: no partial
/// command list is ever handed to a caller.
#[derive(Error, Debug)]
pub enum GcodeError {
    /// A numeral could not be parsed as a float
    #[error("Invalid gcode: \"{line}\"")]
    Syntax {
        /// The original, unmodified source line.
        line: String,
    },

    /// An arc whose radius is zero (or numerically indistinguishable from zero)
    #[error("Degenerate arc (zero radius): \"{line}\"")]
    DegenerateArc {
        /// The original source line of the arc command.
        line: String,
    },

    /// An arc that would expand into more moves than allowed
    #[error("Arc needs more than {max} segments: \"{line}\"")]
    ArcTooLong {
        /// The original source line of the arc command.
        line: String,
        /// The segment limit that was exceeded.
        max: usize,
    },

    /// The arc segment length is not a positive, finite number
    #[error("Arc segment length must be positive and finite, got {value}")]
    InvalidSegmentLength {
        /// The rejected segment length in millimeters.
        value: f32,
    },

    /// The program source could not be read or written
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connection error type
///
/// Raised while opening the TCP connection; the streaming session never began.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Connection attempt timed out
    #[error("Connection to {address} timed out after {timeout_ms}ms")]
    Timeout {
        /// The address that was dialed.
        address: String,
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// Host could not be resolved or the port is out of range
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress {
        /// The address as given by the caller.
        address: String,
        /// Why the address was rejected.
        reason: String,
    },

    /// The device refused or reset the connection attempt
    #[error("Connection to {address} refused: {reason}")]
    Refused {
        /// The address that was dialed.
        address: String,
        /// The reason reported by the operating system.
        reason: String,
    },
}

/// Session error type
///
/// Aborts the active streaming session only. Cleanup (reset + close) still runs.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The device answered with something other than an `OK...` line
    #[error("Answer \"{response}\" does not match the expected answer")]
    ProtocolViolation {
        /// The offending response line, without its terminator.
        response: String,
    },

    /// Transport failure mid-session, including the device closing the socket
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main error type for Plotstream
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// G-Code error
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Session error
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A streaming session is already running
    #[error("A streaming session is already active")]
    SessionActive,

    /// No program has been opened yet
    #[error("No program loaded, open a file first")]
    NoProgramLoaded,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Connection(ConnectionError::Timeout { .. }))
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a G-Code error
    pub fn is_gcode_error(&self) -> bool {
        matches!(self, Error::Gcode(_))
    }

    /// Check if this is a session error
    pub fn is_session_error(&self) -> bool {
        matches!(self, Error::Session(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_cites_line() {
        let err = GcodeError::Syntax {
            line: "G1 X1.2.3".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid gcode: \"G1 X1.2.3\"");

        let err = GcodeError::ArcTooLong {
            line: "G2 I1e9".to_string(),
            max: 1000,
        };
        assert_eq!(err.to_string(), "Arc needs more than 1000 segments: \"G2 I1e9\"");
    }

    #[test]
    fn test_connection_error_display() {
        let err = ConnectionError::Timeout {
            address: "10.0.0.2:8888".to_string(),
            timeout_ms: 2500,
        };
        assert_eq!(
            err.to_string(),
            "Connection to 10.0.0.2:8888 timed out after 2500ms"
        );
    }

    #[test]
    fn test_error_classification() {
        let err: Error = ConnectionError::Refused {
            address: "localhost:1".to_string(),
            reason: "refused".to_string(),
        }
        .into();
        assert!(err.is_connection_error());
        assert!(!err.is_timeout());

        let err: Error = SessionError::ProtocolViolation {
            response: "ERR".to_string(),
        }
        .into();
        assert!(err.is_session_error());
        assert_eq!(
            err.to_string(),
            "Answer \"ERR\" does not match the expected answer"
        );

        let err: Error = GcodeError::DegenerateArc {
            line: "G2 X1".to_string(),
        }
        .into();
        assert!(err.is_gcode_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "closed");
        let err: SessionError = io_err.into();
        assert!(matches!(err, SessionError::Io(_)));
    }
}
