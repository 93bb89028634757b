//! Plotstream Settings Crate
//!
//! Loads, validates, and saves the application configuration.

pub mod config;
pub mod error;

pub use config::{Config, ConnectionSettings, FileProcessingSettings};
pub use error::{SettingsError, SettingsResult};
