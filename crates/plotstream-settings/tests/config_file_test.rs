use plotstream_camtools::ArcZHandling;
use plotstream_settings::{Config, SettingsError};
use tempfile::TempDir;

fn sample() -> Config {
    let mut config = Config::new();
    config.connection.host = "plotter.local".to_string();
    config.connection.port = 2323;
    config.connection.enable_fans = true;
    config.file_processing.arc_segment_length = 0.25;
    config.file_processing.arc_z_handling = ArcZHandling::Omit;
    config
}

#[test]
fn test_save_and_load_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    sample().save_to_file(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("[connection]"));
    assert!(text.contains("arc_z_handling = \"omit\""));

    assert_eq!(Config::load_from_file(&path).unwrap(), sample());
}

#[test]
fn test_save_and_load_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.json");

    sample().save_to_file(&path).unwrap();
    assert_eq!(Config::load_from_file(&path).unwrap(), sample());
}

#[test]
fn test_unknown_extension_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    assert!(matches!(
        sample().save_to_file(&path),
        Err(SettingsError::UnsupportedFormat(_))
    ));
    std::fs::write(&path, "connection: {}").unwrap();
    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_invalid_file_values_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[file_processing]\narc_segment_length = -1.0\n").unwrap();
    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::InvalidSetting { .. })
    ));

    std::fs::write(&path, "[connection\n").unwrap();
    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::TomlError(_))
    ));
}

#[test]
fn test_load_or_default() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");
    assert_eq!(Config::load_or_default(Some(&missing)).unwrap(), Config::default());

    let present = dir.path().join("present.toml");
    sample().save_to_file(&present).unwrap();
    assert_eq!(Config::load_or_default(Some(&present)).unwrap(), sample());
}
