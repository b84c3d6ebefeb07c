//! Loading engine configuration from disk.

use std::io::Write;

use horizon_lattice_css::config::{EngineConfig, NamingConfig};
use horizon_lattice_css::naming::NamingMode;
use horizon_lattice_css::Error;

#[test]
fn loads_naming_settings_from_a_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[naming]\nmode = \"optimized\"\nprefix = \"s\"\nfirst_id = 10").unwrap();

    let config = EngineConfig::from_file(file.path()).unwrap();
    assert_eq!(
        config.naming,
        NamingConfig {
            mode: NamingMode::Optimized,
            prefix: "s".to_string(),
            first_id: 10,
        }
    );
}

#[test]
fn written_configuration_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("css.toml");

    let mut config = EngineConfig::default();
    config.naming.mode = NamingMode::Optimized;
    std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

    assert_eq!(EngineConfig::from_file(&path).unwrap(), config);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EngineConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn invalid_mode_is_a_config_error() {
    let err = EngineConfig::from_toml_str("[naming]\nmode = \"short\"").unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}
