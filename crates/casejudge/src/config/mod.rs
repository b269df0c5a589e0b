use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub use crate::config::language::{
    DEFAULT_SANDBOX_PATH, FileExtension, Language, RunConfig, SyntaxCheckConfig,
};
use crate::types::ResourceLimits;

pub mod language;
mod loader;

/// Example configuration embedded at compile time.
///
/// Library users can access this to generate a starter config file.
pub const EXAMPLE_CONFIG: &str = include_str!("../../casejudge.example.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid characters in file extension")]
    InvalidFileExtChars,

    #[error("failed to read config file at {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Where test cases for a problem identifier come from
#[derive(Debug, Clone, Deserialize)]
pub struct ProblemStoreConfig {
    /// Base URL of the problem service, e.g. `http://admin_service:5003`.
    /// With no URL every problem is unknown and submissions fall back to a
    /// syntax check.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Timeout for a single fetch, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ProblemStoreConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ProblemStoreConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Config for casejudge
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Default resource limits applied to every run.
    /// Language limits and request limits override these.
    #[serde(default)]
    pub default_limits: ResourceLimits,

    /// Maximum number of test cases of one submission running at once
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    #[serde(default)]
    pub problem_store: ProblemStoreConfig,

    /// Language configurations keyed by language tag
    #[serde(default)]
    pub languages: HashMap<String, Language>,
}

impl Config {
    /// Create a new config with embedded default languages
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty config with no languages
    pub fn empty() -> Self {
        Self {
            default_limits: ResourceLimits::default(),
            max_parallel: default_max_parallel(),
            problem_store: ProblemStoreConfig::default(),
            languages: HashMap::new(),
        }
    }

    /// Resolve limits: config defaults, then language limits, then `overrides`
    pub fn effective_limits(
        &self,
        language: Option<&Language>,
        overrides: Option<&ResourceLimits>,
    ) -> ResourceLimits {
        let mut limits = self.default_limits.clone();
        if let Some(lang_limits) = language.and_then(|l| l.run.limits.as_ref()) {
            limits = limits.with_overrides(lang_limits);
        }
        if let Some(overrides) = overrides {
            limits = limits.with_overrides(overrides);
        }
        limits
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_toml(EXAMPLE_CONFIG).expect("embedded default config should be valid")
    }
}

fn default_max_parallel() -> usize {
    1
}

fn default_request_timeout() -> u64 {
    10
}
