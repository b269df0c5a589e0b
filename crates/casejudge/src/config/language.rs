use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::config::ConfigError;
use crate::types::ResourceLimits;

const INVALID_FILE_EXT_CHARS: [char; 2] = ['/', '.'];

/// Configuration for an interpreted language
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Language {
    /// Human-readable name for the language (e.g., "Python 3")
    pub name: String,

    /// File extension
    pub extension: FileExtension,

    /// Execution configuration
    pub run: RunConfig,

    /// Parse-only check used when a submission has no test cases.
    /// Languages without one cannot be verified on the syntax-only path.
    #[serde(default)]
    pub syntax_check: Option<SyntaxCheckConfig>,
}

impl Language {
    /// Get the source file name for this language
    pub fn source_name(&self) -> String {
        format!("main.{}", self.extension)
    }

    /// Expand placeholders in the given command
    pub fn expand_command(command: &[String], source: &str) -> Vec<String> {
        command
            .iter()
            .map(|arg| arg.replace("{source}", source))
            .collect()
    }
}

/// File extension without dot (e.g., "py")
#[derive(Debug, Clone, Serialize)]
pub struct FileExtension(String);

impl FileExtension {
    pub fn new(extension: &str) -> Result<Self, ConfigError> {
        let contains_invalid = extension
            .chars()
            .any(|c| INVALID_FILE_EXT_CHARS.contains(&c));
        if contains_invalid {
            return Err(ConfigError::InvalidFileExtChars);
        }
        Ok(Self(extension.to_owned()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for FileExtension {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FileExtension::new(&s).map_err(|_| {
            de::Error::invalid_value(
                de::Unexpected::Str(&s),
                &"a file extension without '/' or '.' characters",
            )
        })
    }
}

impl std::fmt::Display for FileExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Default PATH for child processes
pub const DEFAULT_SANDBOX_PATH: &str = "/usr/local/bin:/usr/bin:/bin";

/// Configuration for the execution step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Command and arguments with placeholders
    /// Placeholders: {source}
    pub command: Vec<String>,

    /// Environment variables to set. The child environment is otherwise empty.
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// PATH environment variable for the child process
    #[serde(default = "default_sandbox_path")]
    pub path: String,

    /// Resource limits for execution (overrides defaults)
    #[serde(default)]
    pub limits: Option<ResourceLimits>,
}

/// Configuration for the parse-only check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxCheckConfig {
    /// Command and arguments with placeholders
    /// Placeholders: {source}
    pub command: Vec<String>,
}

fn default_sandbox_path() -> String {
    DEFAULT_SANDBOX_PATH.to_owned()
}
