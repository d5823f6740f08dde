use millpath_settings::{Config, SettingsError};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_toml_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("millpath.toml");

    let mut config = Config::new();
    config.tool.radius = 12;
    config.machine.depth_step = 5;
    config.machine.drift.numerator = 50000;
    config.strategy.orthogonal_weight = 3;
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
    assert!(fs::read_to_string(&path).unwrap().contains("[machine]"));
}

#[test]
fn test_json_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("millpath.json");

    let mut config = Config::new();
    config.machine.line_budget = 128;
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded.machine.line_budget, 128);
    assert_eq!(loaded, config);
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[tool]\nradius = -3\n").unwrap();
    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::InvalidSetting { .. })
    ));

    fs::write(&path, "[tool\nradius = ").unwrap();
    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::TomlError(_))
    ));
}

#[test]
fn test_invalid_config_is_not_saved() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("millpath.toml");
    let mut config = Config::new();
    config.machine.z_increment = 0;
    assert!(config.save_to_file(&path).is_err());
    assert!(!path.exists());
}

#[test]
fn test_load_or_default_with_explicit_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.json");
    fs::write(&path, r#"{ "tool": { "radius": 4 } }"#).unwrap();
    let config = Config::load_or_default(Some(&path)).unwrap();
    assert_eq!(config.tool.radius, 4);

    let missing = dir.path().join("missing.toml");
    assert!(matches!(
        Config::load_or_default(Some(&missing)),
        Err(SettingsError::IoError(_))
    ));
}
