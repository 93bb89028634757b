//! Command stream assembly
//!
//! Drives a program source through the parser and the arc expander and
//! collects the final command list. Arcs are expanded against the pen
//! position reached by the lines before them. The first error aborts the whole
//! load and no partial list is returned.

use std::io::BufRead;
use std::path::Path;

use plotstream_camtools::{ArcError, ArcExpander, ArcExpanderConfig};
use plotstream_core::{Command, CommandList, GcodeError, Position};

use super::parser::parse_line;
use crate::utils::GcodeFileReader;

/// Builds command lists from program sources
#[derive(Debug, Clone, Default)]
pub struct CommandStream {
    expander: ArcExpander,
}

impl CommandStream {
    /// Create a stream using the given arc expansion settings
    pub fn new(config: ArcExpanderConfig) -> Self {
        Self {
            expander: ArcExpander::new(config),
        }
    }

    /// Create a stream with the given arc segment length
    pub fn with_segment_length(segment_length: f32) -> Self {
        Self {
            expander: ArcExpander::with_segment_length(segment_length),
        }
    }

    /// Arc expansion settings in use
    pub fn arc_config(&self) -> &ArcExpanderConfig {
        self.expander.config()
    }

    /// Load a program file
    ///
    /// The file is closed before this returns, whatever the outcome.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<CommandList, GcodeError> {
        self.check_config()?;
        let reader = GcodeFileReader::new(path)?;
        let mut assembler = Assembler::new(&self.expander);

        let stats = reader.read_lines(|line_number, line| assembler.push(line_number, line))?;

        let commands = assembler.finish();
        tracing::info!(
            "Loaded {} commands from {} lines in {}ms",
            commands.len(),
            stats.lines_read,
            stats.read_time_ms
        );
        Ok(commands)
    }

    /// Load a program from any buffered reader
    pub fn load_reader<R: BufRead>(&self, reader: R) -> Result<CommandList, GcodeError> {
        self.check_config()?;
        let mut assembler = Assembler::new(&self.expander);
        for (index, line) in reader.lines().enumerate() {
            assembler.push(index + 1, &line?)?;
        }
        Ok(assembler.finish())
    }

    /// Load a program held in memory
    pub fn load_str(&self, text: &str) -> Result<CommandList, GcodeError> {
        self.check_config()?;
        let mut assembler = Assembler::new(&self.expander);
        for (index, line) in text.lines().enumerate() {
            assembler.push(index + 1, line)?;
        }
        Ok(assembler.finish())
    }

    fn check_config(&self) -> Result<(), GcodeError> {
        let value = self.expander.config().segment_length;
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(GcodeError::InvalidSegmentLength { value })
        }
    }
}

/// Per-load state: pen position and the commands collected so far
struct Assembler<'a> {
    expander: &'a ArcExpander,
    position: Position,
    commands: CommandList,
}

impl<'a> Assembler<'a> {
    fn new(expander: &'a ArcExpander) -> Self {
        Self {
            expander,
            position: Position::default(),
            commands: CommandList::new(),
        }
    }

    fn push(&mut self, line_number: usize, line: &str) -> Result<(), GcodeError> {
        let command = match parse_line(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(()),
            Err(e) => {
                tracing::warn!("Line {}: {}", line_number, e);
                return Err(e);
            }
        };

        if command.is_arc() {
            self.push_arc(line_number, line, &command)
        } else {
            if command.is_line_move() {
                self.position.advance(&command);
            }
            self.commands.push(command);
            Ok(())
        }
    }

    fn push_arc(&mut self, line_number: usize, line: &str, arc: &Command) -> Result<(), GcodeError> {
        let segments = self
            .expander
            .expand(arc, self.position)
            .map_err(|e| {
                tracing::warn!("Line {}: {}", line_number, e);
                match e {
                    ArcError::InvalidSegmentLength { value } => {
                        GcodeError::InvalidSegmentLength { value }
                    }
                    ArcError::TooManySegments { max, .. } => GcodeError::ArcTooLong {
                        line: line.to_string(),
                        max,
                    },
                    ArcError::DegenerateRadius { .. } | ArcError::NotAnArc => {
                        GcodeError::DegenerateArc {
                            line: line.to_string(),
                        }
                    }
                }
            })?;

        self.commands.reserve(segments.len());
        for segment in segments {
            self.position.advance(&segment);
            self.commands.push(segment);
        }
        Ok(())
    }

    fn finish(self) -> CommandList {
        self.commands
    }
}
