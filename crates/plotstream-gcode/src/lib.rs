//! # Plotstream G-code
//!
//! Reading and writing plotter programs.
//!
//! - **Parser**: one raw line to a structured [`Command`](plotstream_core::Command)
//! - **Serializer**: commands to the canonical fixed-precision line format
//! - **Command stream**: a whole program to its final command list, with
//!   arcs expanded into line moves

pub mod gcode;
pub mod utils;

pub use gcode::{
    format_value, parse_line, serialize, serialize_all, write_commands, Canonical, CommandStream,
};
pub use utils::{save_commands, FileReadStats, GcodeFileReader};
