//! # Plotstream Core
//!
//! Core types and utilities for Plotstream.
//! Provides the structured motion command, the pen position model, the
//! connection state machine, and the error taxonomy shared by all crates.

pub mod data;
pub mod error;
pub mod types;

pub use data::{ArcDirection, Command, ConnectionState, Position, Word};

pub use error::{ConnectionError, Error, GcodeError, Result, SessionError};

pub use types::{thread_safe, ThreadSafe};

/// Ordered list of commands produced from one program
pub type CommandList = Vec<Command>;
