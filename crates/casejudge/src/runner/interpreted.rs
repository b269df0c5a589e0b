//! Runner for interpreted languages
//!
//! Writes the source into a fresh workspace and hands it to the configured
//! interpreter command.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::config::Language;
use crate::runner::{LanguageRunner, ProcessSpec, RunError, SyntaxCheck, Workspace, run_process};
use crate::types::{ExecutionResult, ResourceLimits};

/// Runs source files through a configured interpreter
#[derive(Debug, Clone)]
pub struct InterpretedRunner {
    tag: String,
    language: Language,
    /// Limits used when a run has no overrides
    limits: ResourceLimits,
}

impl InterpretedRunner {
    /// `limits` are the fully resolved limits, see [`Config::effective_limits`]
    ///
    /// [`Config::effective_limits`]: crate::config::Config::effective_limits
    pub fn new(tag: impl Into<String>, language: Language, limits: ResourceLimits) -> Self {
        Self {
            tag: tag.into(),
            language,
            limits,
        }
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Limits used when a run has no overrides
    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Write `code` into a new workspace and run `command` against it
    async fn run_in_workspace(
        &self,
        command: &[String],
        code: &str,
        input: &str,
        limits: &ResourceLimits,
    ) -> Result<ExecutionResult, RunError> {
        let workspace = Workspace::create()?;
        let source_name = self.language.source_name();
        workspace.write_file(&source_name, code.as_bytes()).await?;

        let command = Language::expand_command(command, &source_name);
        debug!(?command, "running source");

        let spec = ProcessSpec {
            command,
            working_dir: workspace.path(),
            path: &self.language.run.path,
            env: &self.language.run.env,
        };
        let result = run_process(spec, input.as_bytes(), limits).await;

        workspace.close();
        result
    }
}

#[async_trait]
impl LanguageRunner for InterpretedRunner {
    fn tag(&self) -> &str {
        &self.tag
    }

    #[instrument(skip(self, code, input, overrides), fields(language = %self.tag))]
    async fn run(
        &self,
        code: &str,
        input: &str,
        overrides: Option<&ResourceLimits>,
    ) -> ExecutionResult {
        let limits = match overrides {
            Some(overrides) => self.limits.with_overrides(overrides),
            None => self.limits.clone(),
        };

        match self
            .run_in_workspace(&self.language.run.command, code, input, &limits)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "run could not be carried out");
                ExecutionResult::setup_failure(e.to_string())
            }
        }
    }

    #[instrument(skip(self, code), fields(language = %self.tag))]
    async fn check_syntax(&self, code: &str) -> SyntaxCheck {
        let Some(ref check) = self.language.syntax_check else {
            return SyntaxCheck::Unavailable {
                reason: format!("no syntax check configured for '{}'", self.tag),
            };
        };

        let result = match self
            .run_in_workspace(&check.command, code, "", &self.limits)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "syntax check could not be carried out");
                return SyntaxCheck::Unavailable {
                    reason: e.to_string(),
                };
            }
        };

        if result.timed_out {
            return SyntaxCheck::Unavailable {
                reason: "syntax check timed out".to_owned(),
            };
        }
        if result.exit_code == 0 {
            return SyntaxCheck::Valid;
        }

        let diagnostic = match result.stderr.trim() {
            "" => format!("exit code {}", result.exit_code),
            stderr => stderr.to_owned(),
        };
        debug!(%diagnostic, "syntax check rejected source");
        SyntaxCheck::Invalid { diagnostic }
    }
}
