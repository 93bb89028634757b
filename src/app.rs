//! Application controller
//!
//! Holds the open program and the configuration, and starts streaming
//! sessions. The command list is produced once when a file is opened and
//! shared read-only with every session started from it.

use plotstream_communication::{SessionHandle, Streamer};
use plotstream_core::{Command, CommandList, Error, GcodeError, Position, Result};
use plotstream_gcode::{save_commands, CommandStream};
use plotstream_settings::Config;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Axis-aligned XY extent of a program's line moves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgramBounds {
    pub min: Position,
    pub max: Position,
}

impl ProgramBounds {
    /// Extent of every position reached by a G0/G1 move, starting from the origin
    ///
    /// `None` when the program has no line move.
    pub fn of(commands: &[Command]) -> Option<Self> {
        let mut position = Position::default();
        let mut bounds: Option<Self> = None;

        for command in commands.iter().filter(|c| c.is_line_move()) {
            position.advance(command);
            let b = bounds.get_or_insert(Self {
                min: position,
                max: position,
            });
            b.min.x = b.min.x.min(position.x);
            b.min.y = b.min.y.min(position.y);
            b.max.x = b.max.x.max(position.x);
            b.max.y = b.max.y.max(position.y);
        }
        bounds
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

/// Open program, settings, and the session starter
pub struct PlotterController {
    config: Config,
    stream: CommandStream,
    program_path: Option<PathBuf>,
    commands: Option<Arc<CommandList>>,
    streamer: Streamer,
}

impl PlotterController {
    /// Create a controller with the given configuration
    pub fn new(config: Config) -> Self {
        let stream = CommandStream::new(config.arc_config());
        Self {
            config,
            stream,
            program_path: None,
            commands: None,
            streamer: Streamer::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable access to the connection and session settings
    ///
    /// Arc settings changed here take effect on the next open; use
    /// [`set_arc_segment_length`](Self::set_arc_segment_length) to re-parse now.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Parse a program file and make it the current program
    ///
    /// On failure the previously open program stays loaded.
    pub fn open_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let commands = self.stream.load_file(path)?;
        let count = commands.len();

        self.program_path = Some(path.to_path_buf());
        self.commands = Some(Arc::new(commands));
        Ok(count)
    }

    /// Write the current program in canonical form
    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let commands = self.commands.as_ref().ok_or(Error::NoProgramLoaded)?;
        save_commands(path, commands)?;
        Ok(())
    }

    /// Forget the current program
    pub fn close_file(&mut self) {
        if let Some(path) = self.program_path.take() {
            tracing::info!("Closed {}", path.display());
        }
        self.commands = None;
    }

    /// Change the arc segment length and re-parse the open program
    ///
    /// If re-parsing fails, the previous length and program are kept.
    pub fn set_arc_segment_length(&mut self, segment_length: f32) -> Result<()> {
        if !(segment_length.is_finite() && segment_length > 0.0) {
            return Err(GcodeError::InvalidSegmentLength {
                value: segment_length,
            }
            .into());
        }

        let mut arc_config = self.config.arc_config();
        arc_config.segment_length = segment_length;
        let stream = CommandStream::new(arc_config);

        if let Some(path) = &self.program_path {
            tracing::info!(
                "Arc segment length changed to {}, re-reading {}",
                segment_length,
                path.display()
            );
            let commands = stream.load_file(path)?;
            self.commands = Some(Arc::new(commands));
        }

        self.config.file_processing.arc_segment_length = segment_length;
        self.stream = stream;
        Ok(())
    }

    /// Commands of the open program
    pub fn commands(&self) -> Option<&[Command]> {
        self.commands.as_deref().map(Vec::as_slice)
    }

    /// Path of the open program
    pub fn program_path(&self) -> Option<&Path> {
        self.program_path.as_deref()
    }

    /// Whether a session is running
    pub fn is_streaming(&self) -> bool {
        self.streamer.is_busy()
    }

    /// Stream the open program using the configured connection
    pub fn start_streaming(&self) -> Result<SessionHandle> {
        let commands = self.commands.clone().ok_or(Error::NoProgramLoaded)?;
        self.streamer.start(
            self.config.connection_params(),
            commands,
            self.config.session_options(),
        )
    }
}
