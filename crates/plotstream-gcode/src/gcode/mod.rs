//! G-code program handling
//!
//! Line parsing, canonical serialization, and assembly of a whole program
//! into the command list that gets streamed.

pub mod parser;
pub mod serializer;
pub mod stream;

pub use parser::parse_line;
pub use serializer::{format_value, serialize, serialize_all, write_commands, Canonical};
pub use stream::CommandStream;
