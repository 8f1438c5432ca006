//! Configuration discovery and graceful degradation
//!
//! Tests that touch `XUANJI_TEST_CONFIG` are marked `#[serial]` so they don't
//! race on the process environment.

use serde::Deserialize;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};
use xuanji_common::config::{config_file_path, load_toml_config, LoggingConfig};
use xuanji_common::Error;

const ENV_VAR: &str = "XUANJI_TEST_CONFIG";

#[derive(Debug, Default, Deserialize)]
struct SampleConfig {
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    logging: LoggingConfig,
}

#[test]
#[serial]
fn test_cli_path_wins_over_env() {
    env::set_var(ENV_VAR, "/tmp/from-env.toml");
    let cli = Path::new("/tmp/from-cli.toml");

    let path = config_file_path("xuanji-test", Some(cli), ENV_VAR);
    assert_eq!(path.as_deref(), Some(cli));

    env::remove_var(ENV_VAR);
}

#[test]
#[serial]
fn test_env_path_used_without_cli() {
    env::set_var(ENV_VAR, "/tmp/from-env.toml");

    let path = config_file_path("xuanji-test", None, ENV_VAR);
    assert_eq!(path.as_deref(), Some(Path::new("/tmp/from-env.toml")));

    env::remove_var(ENV_VAR);
}

#[test]
#[serial]
fn test_blank_env_path_ignored() {
    env::set_var(ENV_VAR, "   ");

    let path = config_file_path("xuanji-test-module-that-does-not-exist", None, ENV_VAR);
    assert_eq!(path, None);

    env::remove_var(ENV_VAR);
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");

    let config: SampleConfig = load_toml_config(Some(&missing)).unwrap();
    assert_eq!(config.port, None);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_no_path_falls_back_to_defaults() {
    let config: SampleConfig = load_toml_config(None).unwrap();
    assert_eq!(config.port, None);
}

#[test]
fn test_valid_file_loaded() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "port = 6000\n\n[logging]\nlevel = \"debug\"").unwrap();

    let config: SampleConfig = load_toml_config(Some(file.path())).unwrap();
    assert_eq!(config.port, Some(6000));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_invalid_toml_is_a_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "port = = 6000").unwrap();

    let result: Result<SampleConfig, Error> = load_toml_config(Some(file.path()));
    assert!(matches!(result, Err(Error::Config(_))));
}
