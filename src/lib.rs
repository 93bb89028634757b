//! # Plotstream
//!
//! Streams G-code programs to a network pen plotter.
//!
//! ## Architecture
//!
//! Plotstream is organized as a workspace with multiple crates:
//!
//! 1. **plotstream-core** - Command model, pen position, connection state, errors
//! 2. **plotstream-camtools** - Arc expansion into bounded line moves
//! 3. **plotstream-gcode** - Line parser, canonical serializer, program loading
//! 4. **plotstream-communication** - TCP transport, acknowledged session protocol, worker
//! 5. **plotstream-settings** - TOML/JSON configuration
//! 6. **plotstream** - Controller and command line binary that tie the crates together
//!
//! ## Features
//!
//! - **Arc Expansion**: G2/G3 arcs become G1 moves no longer than the configured segment length
//! - **Canonical Output**: fixed field order and three decimals, usable as a save format
//! - **Acknowledged Streaming**: one line out, one `OK` back, reset and close on every exit path
//! - **Cooperative Cancellation**: stops at the next command boundary

pub mod app;

pub use app::{PlotterController, ProgramBounds};

pub use plotstream_core::{
    ArcDirection, Command, CommandList, ConnectionError, ConnectionState, Error, GcodeError,
    Position, Result, SessionError, Word,
};

pub use plotstream_camtools::{ArcExpander, ArcExpanderConfig, ArcZHandling};

pub use plotstream_gcode::{parse_line, save_commands, serialize, serialize_all, CommandStream};

pub use plotstream_communication::{
    parse_port, CancellationToken, ConnectionParams, ErrorKind, SessionEvent, SessionHandle,
    SessionOptions, SessionOutcome, SessionSummary, Streamer,
};

pub use plotstream_settings::{Config, ConnectionSettings, FileProcessingSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Log output format
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable multi-line output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Minimum log level
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, so stdout stays free for program text
/// - RUST_LOG environment variable support, taking precedence over `level`
/// - Pretty or JSON formatting
pub fn init_logging(level: LogLevel, format: LogFormat) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_thread_names(true)
                    .with_line_number(true)
                    .pretty(),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_thread_names(true)
                    .json(),
            )
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
