//! Plotter session protocol
//!
//! Strict request/response: write one line, flush, wait for exactly one answer
//! starting with `OK`. A session enables the motors, optionally the fans, then
//! sends every command in order. However the loop ends, the client sends the
//! reset line once and closes the transport.

use super::{CancellationToken, ErrorKind, LineTransport, SessionListener};
use plotstream_core::{Command, ConnectionState, SessionError};
use plotstream_gcode::serialize;
use std::fmt;
use std::io;

/// Prefix every acknowledgment must start with
pub const ACK_PREFIX: &str = "OK";

/// Fixed control lines understood by the plotter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Power the stepper motors
    EnableMotors,
    /// Switch the fans on
    EnableFans,
    /// Switch the fans off
    DisableFans,
    /// Return the device to its idle state
    Reset,
}

impl ControlCommand {
    /// The newline-terminated wire line
    pub fn line(&self) -> &'static str {
        match self {
            ControlCommand::EnableMotors => "E1\n",
            ControlCommand::EnableFans => "F1\n",
            ControlCommand::DisableFans => "F0\n",
            ControlCommand::Reset => "R\n",
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.line().trim_end())
    }
}

/// Per-session switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Send the enable-fans line after enabling the motors
    pub enable_fans: bool,
}

/// How a session that did not fail ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every command was acknowledged
    Completed {
        /// Number of data commands acknowledged
        sent: usize,
    },
    /// Cancellation stopped the loop early
    Cancelled {
        /// Number of data commands acknowledged before stopping
        sent: usize,
    },
}

impl SessionOutcome {
    /// Number of data commands acknowledged
    pub fn sent(&self) -> usize {
        match self {
            SessionOutcome::Completed { sent } | SessionOutcome::Cancelled { sent } => *sent,
        }
    }

    /// Whether the session stopped because of cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SessionOutcome::Cancelled { .. })
    }
}

/// Drives one session over a connected transport
///
/// Owns the transport; reset and close run exactly once, from
/// [`stream`](Self::stream) or, failing that, from `Drop`.
pub struct ProtocolClient<T: LineTransport> {
    transport: Option<T>,
    peer: String,
}

impl<T: LineTransport> ProtocolClient<T> {
    /// Take ownership of a connected transport
    pub fn new(transport: T) -> Self {
        let peer = transport.name();
        Self {
            transport: Some(transport),
            peer,
        }
    }

    /// Run the session to its end
    ///
    /// `commands` are serialized in canonical form. `cancel` is checked before
    /// each data command. The listener sees the state changes, progress after
    /// every acknowledgment, and the error that ended the session, if any.
    pub fn stream(
        mut self,
        commands: &[Command],
        options: SessionOptions,
        cancel: &CancellationToken,
        listener: &dyn SessionListener,
    ) -> Result<SessionOutcome, SessionError> {
        listener.on_state_changed(ConnectionState::Streaming);
        tracing::info!(
            "Streaming {} commands to {} (fans {})",
            commands.len(),
            self.peer,
            if options.enable_fans { "on" } else { "off" }
        );

        let result = self.run(commands, options, cancel, listener);
        match &result {
            Ok(SessionOutcome::Completed { sent }) => {
                tracing::info!("Session finished, {} commands sent", sent);
                listener.on_message("Done");
            }
            Ok(SessionOutcome::Cancelled { sent }) => {
                tracing::info!("Session cancelled after {} commands", sent);
                listener.on_message("Cancelled");
            }
            Err(e) => {
                tracing::error!("Session aborted: {}", e);
                listener.on_error(ErrorKind::from(e), &e.to_string());
            }
        }

        listener.on_state_changed(ConnectionState::Disconnecting);
        self.shutdown();
        listener.on_state_changed(ConnectionState::Disconnected);
        result
    }

    fn run(
        &mut self,
        commands: &[Command],
        options: SessionOptions,
        cancel: &CancellationToken,
        listener: &dyn SessionListener,
    ) -> Result<SessionOutcome, SessionError> {
        self.exchange(ControlCommand::EnableMotors.line())?;
        if options.enable_fans {
            self.exchange(ControlCommand::EnableFans.line())?;
        }

        let total = commands.len();
        for (index, command) in commands.iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok(SessionOutcome::Cancelled { sent: index });
            }
            self.exchange(&serialize(command))?;

            let sent = index + 1;
            listener.on_progress(sent, total);
            listener.on_message(&format!("({}/{})", sent, total));
        }

        Ok(SessionOutcome::Completed { sent: total })
    }

    /// Send one line and validate its acknowledgment
    fn exchange(&mut self, line: &str) -> Result<String, SessionError> {
        let transport = self.transport.as_mut().ok_or_else(|| {
            SessionError::Io(io::Error::new(
                io::ErrorKind::NotConnected,
                "Session already closed",
            ))
        })?;

        tracing::trace!("> {}", line.trim_end());
        transport.write_line(line)?;

        let response = transport.read_line()?.ok_or_else(|| {
            SessionError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Connection closed by device while waiting for an answer",
            ))
        })?;
        tracing::trace!("< {}", response);

        if response.starts_with(ACK_PREFIX) {
            Ok(response)
        } else {
            Err(SessionError::ProtocolViolation { response })
        }
    }

    /// Best-effort reset and close; does nothing the second time
    fn shutdown(&mut self) {
        let Some(mut transport) = self.transport.take() else {
            return;
        };

        if let Err(e) = transport.write_line(ControlCommand::Reset.line()) {
            tracing::warn!("Failed to send reset to {}: {}", self.peer, e);
        }
        if let Err(e) = transport.close() {
            tracing::warn!("Failed to close connection to {}: {}", self.peer, e);
        }
    }
}

impl<T: LineTransport> Drop for ProtocolClient<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
