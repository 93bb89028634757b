//! Type aliases shared between crates.
//!
//! - [`aliases`]: thread-safe wrappers used by the streaming worker

pub mod aliases;

pub use aliases::*;
