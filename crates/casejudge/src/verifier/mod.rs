//! Verification of submissions against test cases
//!
//! Runs a submission once per test case, classifies every run and folds the
//! results into an [`AggregateVerdict`]. All failures, including store and
//! runner failures, end up inside the verdict.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

pub use crate::verifier::evaluate::{aggregate, classify, normalize_output};

mod evaluate;

use crate::config::Config;
use crate::runner::{LanguageRunner, RunError, RunnerRegistry, SyntaxCheck};
use crate::store::{self, ProblemStore, StoreError};
use crate::types::{ResourceLimits, TestCase};
use crate::verdict::{AggregateVerdict, CaseVerdict, ErrorKind};

/// Language assumed when a request names none
pub const DEFAULT_LANGUAGE: &str = "python";

/// Errors building a [`Verifier`]; verification itself never fails
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("problem store setup failed: {0}")]
    Store(#[from] StoreError),
}

/// A submission to verify
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// Source code of the submission
    #[serde(default)]
    pub code: String,

    /// Language tag
    #[serde(default = "default_language")]
    pub language: String,

    /// Problem whose stored test cases are used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_id: Option<String>,

    /// Inline test cases; these take precedence over `problem_id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_cases: Option<Vec<TestCase>>,

    /// Caller's identifier, only used for logging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<String>,

    /// Per-request limit overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourceLimits>,
}

impl VerificationRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: default_language(),
            problem_id: None,
            test_cases: None,
            submission_id: None,
            limits: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_problem(mut self, problem_id: impl Into<String>) -> Self {
        self.problem_id = Some(problem_id.into());
        self
    }

    pub fn with_test_cases(mut self, cases: Vec<TestCase>) -> Self {
        self.test_cases = Some(cases);
        self
    }

    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = Some(limits);
        self
    }
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_owned()
}

/// Verifies submissions using a set of runners and a problem store
#[derive(Debug, Clone)]
pub struct Verifier {
    runners: RunnerRegistry,
    store: Arc<dyn ProblemStore>,
    max_parallel: usize,
}

impl Verifier {
    /// Create a verifier that evaluates one case at a time
    pub fn new(runners: RunnerRegistry, store: Arc<dyn ProblemStore>) -> Self {
        Self {
            runners,
            store,
            max_parallel: 1,
        }
    }

    /// Set how many cases of one submission may run at once
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel.max(1);
        self
    }

    /// Runners for every configured language, with the configured store
    pub fn from_config(config: &Config) -> Result<Self, VerifyError> {
        let store = store::from_config(&config.problem_store)?;
        Ok(Self::new(RunnerRegistry::from_config(config), store)
            .with_max_parallel(config.max_parallel))
    }

    pub fn runners(&self) -> &RunnerRegistry {
        &self.runners
    }

    /// Verify a submission
    #[instrument(skip_all, fields(
        language = %request.language,
        problem_id = request.problem_id.as_deref(),
        submission_id = request.submission_id.as_deref(),
    ))]
    pub async fn verify(&self, request: &VerificationRequest) -> AggregateVerdict {
        if request.code.trim().is_empty() {
            info!("rejected submission without code");
            return AggregateVerdict::error(ErrorKind::MissingCode, "no code provided");
        }
        if let Some(ref limits) = request.limits
            && let Err(e) = limits.validate()
        {
            info!(error = %e, "rejected submission with invalid limits");
            return AggregateVerdict::error(ErrorKind::InvalidLimits, format!("Invalid limits: {e}"));
        }

        let runner = match self.runners.get(&request.language) {
            Ok(runner) => runner,
            Err(e) => return unsupported(e),
        };

        let cases = self.resolve_cases(request).await;
        let verdict = self
            .evaluate(runner, &request.code, &cases, request.limits.as_ref())
            .await;
        info!(
            status = ?verdict.status,
            passed = verdict.passed,
            total = verdict.total,
            "verification complete"
        );
        verdict
    }

    /// Verify `code` against the given cases with the runner's own limits
    #[instrument(skip(self, code, cases), fields(cases = cases.len()))]
    pub async fn verify_cases(
        &self,
        code: &str,
        language: &str,
        cases: &[TestCase],
    ) -> AggregateVerdict {
        match self.runners.get(language) {
            Ok(runner) => self.evaluate(runner, code, cases, None).await,
            Err(e) => unsupported(e),
        }
    }

    /// Inline cases win; store failures degrade to no cases
    async fn resolve_cases(&self, request: &VerificationRequest) -> Vec<TestCase> {
        if let Some(ref cases) = request.test_cases {
            return cases.clone();
        }
        let Some(ref problem_id) = request.problem_id else {
            return Vec::new();
        };

        match self.store.test_cases(problem_id).await {
            Ok(cases) => {
                debug!(count = cases.len(), "loaded test cases");
                cases
            }
            Err(e) => {
                warn!(error = %e, "could not load test cases, checking syntax only");
                Vec::new()
            }
        }
    }

    async fn evaluate(
        &self,
        runner: Arc<dyn LanguageRunner>,
        code: &str,
        cases: &[TestCase],
        limits: Option<&ResourceLimits>,
    ) -> AggregateVerdict {
        if cases.is_empty() {
            return syntax_only(runner.as_ref(), code).await;
        }
        let details = self.run_cases(runner, code, cases, limits).await;
        aggregate(details)
    }

    /// Run every case, bounded by `max_parallel`, reporting in input order
    async fn run_cases(
        &self,
        runner: Arc<dyn LanguageRunner>,
        code: &str,
        cases: &[TestCase],
        limits: Option<&ResourceLimits>,
    ) -> Vec<CaseVerdict> {
        let permits = Arc::new(Semaphore::new(self.max_parallel));
        let code: Arc<str> = Arc::from(code);
        let limits = limits.cloned();

        let mut tasks = JoinSet::new();
        for (index, case) in cases.iter().cloned().enumerate() {
            let runner = runner.clone();
            let permits = permits.clone();
            let code = code.clone();
            let limits = limits.clone();
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                let result = runner.run(&code, &case.input, limits.as_ref()).await;
                let verdict = classify(&result, &case);
                debug!(case = index + 1, status = verdict.tag(), "case evaluated");
                (index, verdict)
            });
        }

        let mut slots: Vec<Option<CaseVerdict>> = vec![None; cases.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, verdict)) => slots[index] = Some(verdict),
                Err(e) => warn!(error = %e, "case task failed"),
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| CaseVerdict::RuntimeError {
                    message: "case evaluation did not complete".to_owned(),
                })
            })
            .collect()
    }
}

/// Parse-only check for submissions with no test cases
async fn syntax_only(runner: &dyn LanguageRunner, code: &str) -> AggregateVerdict {
    match runner.check_syntax(code).await {
        SyntaxCheck::Valid => AggregateVerdict::syntax_ok(),
        SyntaxCheck::Invalid { diagnostic } => AggregateVerdict::error(
            ErrorKind::SyntaxError,
            format!("Syntax error: {diagnostic}"),
        ),
        SyntaxCheck::Unavailable { reason } => {
            warn!(%reason, "syntax check unavailable");
            AggregateVerdict::error(
                ErrorKind::Internal,
                format!("Syntax check unavailable: {reason}"),
            )
        }
    }
}

fn unsupported(error: RunError) -> AggregateVerdict {
    info!(error = %error, "rejected submission");
    AggregateVerdict::error(ErrorKind::UnsupportedLanguage, error.to_string())
}
