use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use plotstream::{
    init_logging, parse_port, serialize_all, Config, LogFormat, LogLevel, PlotterController,
    ProgramBounds, SessionEvent, SessionOutcome, BUILD_DATE, VERSION,
};

#[derive(Parser, Debug)]
#[command(name = "plotstream", version, about = "Stream G-code programs to a network pen plotter")]
struct Cli {
    /// Configuration file (.toml or .json); defaults to the platform config directory
    #[arg(long, value_name = "PATH", global = true, env = "PLOTSTREAM_CONFIG")]
    config: Option<PathBuf>,

    /// Arc segment length in millimeters, overrides the configuration
    #[arg(long, value_name = "MM", global = true)]
    max_chord_length: Option<f32>,

    /// Minimum log level (stderr)
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Log output format (stderr)
    #[arg(long, value_name = "FORMAT", default_value = "pretty", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Normalize a program: expand arcs and write canonical lines
    Convert {
        /// Program to read
        input: PathBuf,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Stream a program to the plotter
    Send {
        /// Program to stream
        input: PathBuf,
        /// Plotter host
        #[arg(long)]
        host: Option<String>,
        /// Plotter TCP port
        #[arg(long)]
        port: Option<String>,
        /// Switch the fans on before streaming
        #[arg(long)]
        fans: bool,
        /// Connect timeout in milliseconds
        #[arg(long, value_name = "MS")]
        timeout_ms: Option<u64>,
    },
    /// Parse a program and report its size and extent
    Check {
        /// Program to read
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.log_format)?;
    tracing::debug!("plotstream {} (built {})", VERSION, BUILD_DATE);

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(length) = cli.max_chord_length {
        config.file_processing.arc_segment_length = length;
    }

    match cli.command {
        Cmd::Convert { input, output } => {
            config.validate()?;
            let mut controller = PlotterController::new(config);
            open(&mut controller, &input)?;
            match output {
                Some(path) => {
                    controller
                        .save_file(&path)
                        .with_context(|| format!("Failed to save {}", path.display()))?;
                }
                None => {
                    let commands = controller.commands().unwrap_or_default();
                    print!("{}", serialize_all(commands));
                }
            }
        }
        Cmd::Check { input } => {
            config.validate()?;
            let mut controller = PlotterController::new(config);
            let count = open(&mut controller, &input)?;
            println!("{}: {} commands", input.display(), count);
            match controller.commands().and_then(ProgramBounds::of) {
                Some(bounds) => println!(
                    "extent: {} to {} ({:.3} x {:.3} mm)",
                    bounds.min,
                    bounds.max,
                    bounds.width(),
                    bounds.height()
                ),
                None => println!("extent: no line moves"),
            }
        }
        Cmd::Send {
            input,
            host,
            port,
            fans,
            timeout_ms,
        } => {
            if let Some(host) = host {
                config.connection.host = host;
            }
            if let Some(port) = port {
                config.connection.port = parse_port(&config.connection.host, &port)?;
            }
            if let Some(timeout_ms) = timeout_ms {
                config.connection.timeout_ms = timeout_ms;
            }
            config.connection.enable_fans |= fans;
            config.validate()?;

            let mut controller = PlotterController::new(config);
            open(&mut controller, &input)?;
            send(&controller).await?;
        }
    }

    Ok(())
}

fn open(controller: &mut PlotterController, input: &std::path::Path) -> anyhow::Result<usize> {
    controller
        .open_file(input)
        .with_context(|| format!("Failed to open {}", input.display()))
}

async fn send(controller: &PlotterController) -> anyhow::Result<()> {
    let mut handle = controller.start_streaming()?;
    let token = handle.cancellation_token();
    tracing::info!("Session {} started", handle.id());

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c(), if !token.is_cancelled() => {
                if let Err(e) = signal {
                    tracing::warn!("Failed to listen for Ctrl-C: {}", e);
                }
                eprintln!("\nCancelling after the current command...");
                token.cancel();
            }
            event = handle.events_mut().recv() => match event {
                Some(SessionEvent::Progress { sent, total }) => {
                    eprint!("\rSent {}/{}", sent, total);
                }
                Some(SessionEvent::Error { kind, detail }) => {
                    eprintln!("\n{}: {}", kind, detail);
                }
                Some(SessionEvent::StateChanged(state)) => {
                    tracing::debug!("Connection {}", state);
                }
                Some(SessionEvent::Message(_)) => {}
                None => break,
            },
        }
    }

    eprintln!();
    let summary = tokio::task::spawn_blocking(move || handle.join())
        .await?
        .context("Streaming session failed")?;
    match summary.outcome {
        SessionOutcome::Completed { sent } => {
            println!(
                "Sent {} commands in {:.1}s",
                sent,
                summary.duration().num_milliseconds() as f64 / 1000.0
            );
        }
        SessionOutcome::Cancelled { sent } => {
            println!("Cancelled after {} of {} commands", sent, summary.total);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "plotstream",
            "send",
            "drawing.gcode",
            "--host",
            "plotter.local",
            "--port",
            "2323",
            "--fans",
        ])
        .unwrap();

        match cli.command {
            Cmd::Send {
                host, port, fans, ..
            } => {
                assert_eq!(host.as_deref(), Some("plotter.local"));
                assert_eq!(port.as_deref(), Some("2323"));
                assert!(fans);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "plotstream",
            "check",
            "drawing.gcode",
            "--max-chord-length",
            "0.1",
            "--log-format",
            "json",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.max_chord_length, Some(0.1));
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.log_level, LogLevel::Debug);
        assert!(matches!(cli.command, Cmd::Check { .. }));
    }

    #[test]
    fn convert_output_is_optional() {
        let cli = Cli::try_parse_from(["plotstream", "convert", "in.gcode"]).unwrap();
        assert!(matches!(cli.command, Cmd::Convert { output: None, .. }));
    }
}
