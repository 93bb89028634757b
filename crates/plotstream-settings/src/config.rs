//! Configuration for Plotstream
//!
//! Supports JSON and TOML files. The default location is
//! `<config dir>/plotstream/config.toml`.
//!
//! Configuration is organized into sections:
//! - Connection settings (host, port, timeout, fans)
//! - File processing defaults (arc segment length, pen height handling)

use crate::error::{SettingsError, SettingsResult};
use plotstream_camtools::{ArcExpanderConfig, ArcZHandling};
use plotstream_communication::{
    ConnectionParams, SessionOptions, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TIMEOUT_MS,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Plotter connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Host name or IP address of the plotter
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Connect timeout in milliseconds
    pub timeout_ms: u64,
    /// Switch the fans on at the start of each session
    pub enable_fans: bool,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            enable_fans: false,
        }
    }
}

/// Program loading settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessingSettings {
    /// Arc length per emitted move when expanding arcs, in millimeters
    pub arc_segment_length: f32,
    /// What happens to an arc's Z word
    pub arc_z_handling: ArcZHandling,
}

impl Default for FileProcessingSettings {
    fn default() -> Self {
        Self {
            arc_segment_length: 0.5,
            arc_z_handling: ArcZHandling::default(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Plotter address and session behavior
    pub connection: ConnectionSettings,
    /// How programs are read and arcs expanded
    pub file_processing: FileProcessingSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("(none)").to_string(),
            )),
        }
    }
}

impl Config {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("plotstream").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no configuration directory on this platform".into())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path`, or the default location when `None`
    ///
    /// A missing file gives the defaults. A file that exists but does not load
    /// is an error.
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Ok(path) => path,
                Err(e) => {
                    tracing::debug!("{}, using defaults", e);
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_file(&path)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::from_path(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        tracing::info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if self.connection.host.trim().is_empty() {
            return Err(SettingsError::invalid("connection.host", "must not be empty"));
        }

        if self.connection.port == 0 {
            return Err(SettingsError::invalid(
                "connection.port",
                "must be between 1 and 65535",
            ));
        }

        if self.connection.timeout_ms == 0 {
            return Err(SettingsError::invalid("connection.timeout_ms", "must be > 0"));
        }

        let length = self.file_processing.arc_segment_length;
        if !(length.is_finite() && length > 0.0) {
            return Err(SettingsError::invalid(
                "file_processing.arc_segment_length",
                "must be a positive number",
            ));
        }

        Ok(())
    }

    /// Arc expansion settings
    pub fn arc_config(&self) -> ArcExpanderConfig {
        ArcExpanderConfig {
            segment_length: self.file_processing.arc_segment_length,
            z_handling: self.file_processing.arc_z_handling,
        }
    }

    /// Connection parameters for a session
    pub fn connection_params(&self) -> ConnectionParams {
        ConnectionParams::new(self.connection.host.clone(), self.connection.port)
            .with_timeout_ms(self.connection.timeout_ms)
    }

    /// Session switches
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            enable_fans: self.connection.enable_fans,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.connection.host, "127.0.0.1");
        assert_eq!(config.connection.port, 8888);
        assert_eq!(config.connection.timeout_ms, 2500);
        assert!(!config.connection.enable_fans);
        assert_eq!(config.file_processing.arc_segment_length, 0.5);
        assert_eq!(config.file_processing.arc_z_handling, ArcZHandling::Carry);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::new();
        config.connection.port = 0;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::InvalidSetting { .. })
        ));

        let mut config = Config::new();
        config.file_processing.arc_segment_length = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.connection.host = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.connection.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[connection]\nhost = \"plotter.local\"\n").unwrap();
        assert_eq!(config.connection.host, "plotter.local");
        assert_eq!(config.connection.port, 8888);
        assert_eq!(config.file_processing, FileProcessingSettings::default());
    }

    #[test]
    fn test_z_handling_is_lowercase() {
        let config: Config =
            toml::from_str("[file_processing]\narc_z_handling = \"omit\"\n").unwrap();
        assert_eq!(config.arc_config().z_handling, ArcZHandling::Omit);
    }

    #[test]
    fn test_conversions() {
        let mut config = Config::new();
        config.connection.host = "10.0.0.7".to_string();
        config.connection.enable_fans = true;
        config.file_processing.arc_segment_length = 0.2;

        assert_eq!(config.connection_params().address(), "10.0.0.7:8888");
        assert!(config.session_options().enable_fans);
        assert_eq!(config.arc_config().segment_length, 0.2);
    }
}
