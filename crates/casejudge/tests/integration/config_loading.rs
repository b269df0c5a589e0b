use casejudge::config::{Config, ConfigError};

use super::FIXTURES_PATH;

#[test]
fn test_load_valid_config() {
    let path = format!("{FIXTURES_PATH}/configs/valid_full.toml");
    let config = Config::from_file(&path).expect("Failed to load config");

    assert!(config.languages.contains_key("python"));
    assert!(config.languages.contains_key("shell"));
    assert_eq!(config.default_limits.timeout_secs, Some(2));
    assert_eq!(config.max_parallel, 2);
    assert_eq!(
        config.problem_store.base_url.as_deref(),
        Some("http://127.0.0.1:5003")
    );

    let python = &config.languages["python"];
    let limits = config.effective_limits(Some(python), None);
    assert_eq!(limits.timeout_secs, Some(1));
    assert_eq!(limits.max_output, Some(1024));
}

#[test]
fn test_load_minimal_config() {
    let path = format!("{FIXTURES_PATH}/configs/valid_minimal.toml");
    let config = Config::from_file(&path).expect("Failed to load config");

    assert!(config.languages.contains_key("test"));
    assert_eq!(config.max_parallel, 1);
    assert!(config.problem_store.base_url.is_none());
}

#[test]
fn test_load_invalid_empty_name() {
    let path = format!("{FIXTURES_PATH}/configs/invalid_empty_name.toml");
    let result = Config::from_file(&path);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_load_invalid_empty_extension() {
    let path = format!("{FIXTURES_PATH}/configs/invalid_empty_extension.toml");
    let result = Config::from_file(&path);
    assert!(result.is_err());
}

#[test]
fn test_load_invalid_empty_run_command() {
    let path = format!("{FIXTURES_PATH}/configs/invalid_empty_run_command.toml");
    let result = Config::from_file(&path);
    assert!(result.is_err());
}

#[test]
fn test_load_invalid_zero_parallel() {
    let path = format!("{FIXTURES_PATH}/configs/invalid_zero_parallel.toml");
    let result = Config::from_file(&path);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_example_config_round_trips_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("casejudge.toml");
    std::fs::write(&path, casejudge::EXAMPLE_CONFIG).unwrap();

    let config = Config::from_file(&path).expect("Failed to load example config");
    assert_eq!(config.languages.len(), Config::default().languages.len());
}
