//! # Plotstream Communication
//!
//! Talks to the plotter over TCP.
//! Provides the line transport, the acknowledged request/response session
//! with guaranteed reset-and-close, and the background worker that runs one
//! session at a time and publishes its state, progress, and errors.

pub mod communication;

pub use communication::{
    parse_port,
    session::ACK_PREFIX,
    worker::{run_session, start_streaming},
    CancellationToken, ConnectionParams, ControlCommand, ErrorKind, LineTransport, NoOpListener,
    ProtocolClient, SessionEvent, SessionHandle, SessionListener, SessionOptions, SessionOutcome,
    SessionProgress, SessionSummary, Streamer, TcpTransport, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_TIMEOUT_MS,
};
