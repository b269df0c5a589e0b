//! Execution runner for casejudge
//!
//! Runs one piece of source code against one input in a throwaway workspace,
//! under a wall clock limit. Every failure is reported as data in the
//! returned [`ExecutionResult`]; nothing escapes a [`LanguageRunner`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use crate::runner::interpreted::InterpretedRunner;
pub use crate::runner::process::{ProcessSpec, run_process};
pub use crate::runner::workspace::Workspace;

mod interpreted;
mod process;
mod workspace;

use crate::config::Config;
use crate::types::{ExecutionResult, ResourceLimits};

/// Errors that occur while setting up or driving a run
#[derive(Debug, Error)]
pub enum RunError {
    #[error("unsupported language: '{0}'")]
    UnsupportedLanguage(String),

    #[error("failed to create workspace: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("empty command")]
    EmptyCommand,

    #[error("timeout of {0} s is out of range")]
    TimeoutOutOfRange(u64),

    #[error("failed to spawn '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("output capture failed: {0}")]
    Capture(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a parse-only check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxCheck {
    /// The source parses
    Valid,

    /// The source does not parse
    Invalid { diagnostic: String },

    /// The check could not be carried out
    Unavailable { reason: String },
}

/// Runs source code of one language
#[async_trait]
pub trait LanguageRunner: std::fmt::Debug + Send + Sync {
    /// Language tag this runner answers to
    fn tag(&self) -> &str;

    /// Run `code` with `input` on stdin.
    ///
    /// `overrides` take precedence over the runner's own limits.
    async fn run(
        &self,
        code: &str,
        input: &str,
        overrides: Option<&ResourceLimits>,
    ) -> ExecutionResult;

    /// Parse `code` without executing it
    async fn check_syntax(&self, code: &str) -> SyntaxCheck;
}

/// Runners keyed by language tag
#[derive(Debug, Clone, Default)]
pub struct RunnerRegistry {
    runners: HashMap<String, Arc<dyn LanguageRunner>>,
}

impl RunnerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// One [`InterpretedRunner`] per configured language
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        for (tag, language) in &config.languages {
            let limits = config.effective_limits(Some(language), None);
            registry.register(InterpretedRunner::new(tag.clone(), language.clone(), limits));
        }
        registry
    }

    /// Add a runner, replacing any runner with the same tag
    pub fn register(&mut self, runner: impl LanguageRunner + 'static) {
        self.runners
            .insert(runner.tag().to_owned(), Arc::new(runner));
    }

    /// Look up the runner for a language tag
    pub fn get(&self, tag: &str) -> Result<Arc<dyn LanguageRunner>, RunError> {
        self.runners
            .get(tag)
            .cloned()
            .ok_or_else(|| RunError::UnsupportedLanguage(tag.to_owned()))
    }

    /// Registered tags, sorted
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.runners.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}
