//! Data models for Plotstream
//!
//! Provides the structured [`Command`], the pen [`Position`] tracked while a
//! program is read, and the [`ConnectionState`] of a streaming session.

mod command;

pub use command::{ArcDirection, Command, Word, CANONICAL_LETTERS};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Last known pen position in millimeters
///
/// Derived while reading a program; updated only by line moves (G0/G1) and
/// fully expanded arcs that carry X and/or Y.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X-axis position
    pub x: f32,
    /// Y-axis position
    pub y: f32,
}

impl Position {
    /// Create a new position
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another position
    pub fn distance_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Apply the X/Y fields of a command, keeping the current value for absent axes
    pub fn advance(&mut self, command: &Command) {
        if let Some(x) = command.x() {
            self.x = x;
        }
        if let Some(y) = command.y() {
            self.y = y;
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// Streaming session connection state
///
/// `Disconnected → Connecting → Streaming → Disconnecting → Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No socket is open
    #[default]
    Disconnected,
    /// Opening the TCP connection
    Connecting,
    /// Handshake and command lines are being exchanged
    Streaming,
    /// Reset is being sent and the socket closed
    Disconnecting,
}

impl ConnectionState {
    /// Check if a transition from this state to `target` is valid.
    ///
    /// Returns `true` for valid transitions:
    /// - Disconnected → Connecting
    /// - Connecting → Streaming, Disconnecting, Disconnected
    /// - Streaming → Disconnecting
    /// - Disconnecting → Disconnected
    pub fn can_transition_to(&self, target: ConnectionState) -> bool {
        use ConnectionState::*;
        if *self == target {
            return true;
        }
        matches!(
            (self, target),
            (Disconnected, Connecting)
                | (Connecting, Streaming | Disconnecting | Disconnected)
                | (Streaming, Disconnecting)
                | (Disconnecting, Disconnected)
        )
    }

    /// Whether a socket may be open in this state
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Streaming | ConnectionState::Disconnecting)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Streaming => write!(f, "Streaming"),
            Self::Disconnecting => write!(f, "Disconnecting"),
        }
    }
}
