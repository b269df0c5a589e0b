//! Integration tests for casejudge
//!
//! These tests run real submissions and require `python3` on PATH.
//! Run with: cargo test -p casejudge --features integration-tests

#![cfg(feature = "integration-tests")]

use std::fs;
use std::sync::Arc;

use casejudge::{Config, InMemoryProblemStore, RunnerRegistry, Verifier};

mod config_loading;
mod execution;
mod syntax_check;
mod verification;

const FIXTURES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

/// Helper to get fixture file content
pub(crate) fn fixture_source(name: &str) -> String {
    let path = format!("{FIXTURES_PATH}/sources/{name}");
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {path}: {e}"))
}

/// Default configuration with a short timeout so hanging programs end quickly
pub(crate) fn test_config() -> Config {
    let mut config = Config::default();
    config.default_limits.timeout_secs = Some(1);
    config
}

/// Verifier over the test configuration and the given problems
pub(crate) fn test_verifier(store: InMemoryProblemStore) -> Verifier {
    let config = test_config();
    Verifier::new(RunnerRegistry::from_config(&config), Arc::new(store))
}
