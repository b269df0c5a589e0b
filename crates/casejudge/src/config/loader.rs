//! Configuration file loading for casejudge
//!
//! Handles loading and parsing configuration files using the config crate.

use std::path::Path;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};

use crate::config::{Config, ConfigError};

/// Prefix for environment overrides, e.g. `CASEJUDGE_MAX_PARALLEL=4`
const ENV_PREFIX: &str = "CASEJUDGE";

impl Config {
    /// Load configuration from a file, with `CASEJUDGE_*` environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::ReadFile {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            });
        }

        let config = ConfigBuilder::builder()
            .add_source(File::from(path))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config = ConfigBuilder::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_parallel == 0 {
            return Err(ConfigError::Invalid(
                "max_parallel must be at least 1".to_owned(),
            ));
        }
        if let Err(e) = self.default_limits.validate() {
            return Err(ConfigError::Invalid(format!("default limits: {e}")));
        }

        for (id, lang) in &self.languages {
            if lang.name.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "language '{id}' has empty name"
                )));
            }
            if lang.extension.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "language '{id}' has empty extension"
                )));
            }
            if lang.run.command.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "language '{id}' has empty run command"
                )));
            }
            if let Some(ref check) = lang.syntax_check
                && check.command.is_empty()
            {
                return Err(ConfigError::Invalid(format!(
                    "language '{id}' has empty syntax check command"
                )));
            }
            if let Some(ref limits) = lang.run.limits
                && let Err(e) = limits.validate()
            {
                return Err(ConfigError::Invalid(format!(
                    "language '{id}' limits: {e}"
                )));
            }
        }

        Ok(())
    }
}
