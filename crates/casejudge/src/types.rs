use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message reported in `stderr` when a run exceeds its time limit
pub const TIMEOUT_MESSAGE: &str = "Timeout";

/// Exit code reported for runs that never produced a real exit status
pub const ABNORMAL_EXIT_CODE: i32 = -1;

/// A single (input, expected output) pair
///
/// Test cases are identified only by their position in a problem's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Data fed to the program on stdin
    #[serde(default)]
    pub input: String,

    /// Output the program is expected to print
    #[serde(rename = "output", alias = "expected_output", default)]
    pub expected_output: String,
}

impl TestCase {
    pub fn new(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
        }
    }
}

/// Limits that cannot be enforced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitsError {
    #[error("timeout must be positive")]
    ZeroTimeout,

    #[error("timeout of {secs} s exceeds the maximum of {max} s")]
    TimeoutTooLong { secs: u64, max: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Wall clock time limit in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Maximum captured size of each output stream in kilobytes
    #[serde(default)]
    pub max_output: Option<u64>,
}

impl ResourceLimits {
    /// 1 megabyte in kilobytes
    pub const MB: u64 = 1024;

    /// Timeout used when nothing else is configured
    pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

    /// Longest accepted timeout, one hour
    pub const MAX_TIMEOUT_SECS: u64 = 3600;

    /// Create new resource limits with the default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits with every field unset, useful as an override base
    pub fn unset() -> Self {
        Self {
            timeout_secs: None,
            max_output: None,
        }
    }

    /// Set the wall clock time limit in seconds
    pub fn with_timeout_secs(mut self, seconds: u64) -> Self {
        self.timeout_secs = Some(seconds);
        self
    }

    /// Set the maximum output size in kilobytes
    pub fn with_max_output(mut self, kb: u64) -> Self {
        self.max_output = Some(kb);
        self
    }

    /// Apply overrides from another ResourceLimits, preferring values from `overrides`
    pub fn with_overrides(&self, overrides: &ResourceLimits) -> ResourceLimits {
        ResourceLimits {
            timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
            max_output: overrides.max_output.or(self.max_output),
        }
    }

    /// Check that the set values can be enforced
    pub fn validate(&self) -> Result<(), LimitsError> {
        match self.timeout_secs {
            Some(0) => Err(LimitsError::ZeroTimeout),
            Some(secs) if secs > Self::MAX_TIMEOUT_SECS => Err(LimitsError::TimeoutTooLong {
                secs,
                max: Self::MAX_TIMEOUT_SECS,
            }),
            _ => Ok(()),
        }
    }

    /// Effective timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(Self::DEFAULT_TIMEOUT_SECS))
    }

    /// Effective output cap in bytes, if any
    pub fn max_output_bytes(&self) -> Option<usize> {
        self.max_output
            .map(|kb| usize::try_from(kb.saturating_mul(1024)).unwrap_or(usize::MAX))
    }
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            timeout_secs: Some(Self::DEFAULT_TIMEOUT_SECS),
            max_output: Some(64 * Self::MB),
        }
    }
}

/// Raw outcome of running one piece of code against one input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Captured standard output
    pub stdout: String,

    /// Captured standard error, or the failure message for setup errors
    pub stderr: String,

    /// Process exit code, `-1` for timeouts and setup failures
    pub exit_code: i32,

    /// Whether the wall clock limit was hit
    pub timed_out: bool,
}

impl ExecutionResult {
    /// Result for a run that exceeded its time limit.
    ///
    /// Partial output is dropped so the outcome does not depend on how far
    /// the program got before it was killed.
    pub fn timeout() -> Self {
        Self {
            stdout: String::new(),
            stderr: TIMEOUT_MESSAGE.to_owned(),
            exit_code: ABNORMAL_EXIT_CODE,
            timed_out: true,
        }
    }

    /// Result for a run that could not be carried out at all
    pub fn setup_failure(message: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: message.into(),
            exit_code: ABNORMAL_EXIT_CODE,
            timed_out: false,
        }
    }

    /// Check if the run exited cleanly with code 0
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.timed_out && self.exit_code == 0
    }

    /// Exit code 0 and nothing on stderr
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.is_success() && self.stderr.is_empty()
    }
}

impl Default for ExecutionResult {
    fn default() -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: 0,
            timed_out: false,
        }
    }
}
