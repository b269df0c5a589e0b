//! Verdict model
//!
//! Per-case and aggregate classifications, and their JSON shape.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Outcome of a single test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseVerdict {
    /// Trimmed output matched the expected output
    Passed,

    /// The program ran cleanly but printed something else
    Failed { expected: String, actual: String },

    /// Nonzero exit (or setup failure), with the captured stderr
    RuntimeError { message: String },

    /// Wall clock limit exceeded
    Timeout,
}

impl CaseVerdict {
    #[must_use]
    pub fn is_passed(&self) -> bool {
        matches!(self, CaseVerdict::Passed)
    }

    /// Short status tag used in reports
    pub fn tag(&self) -> &'static str {
        match self {
            CaseVerdict::Passed => "passed",
            CaseVerdict::Failed { .. } => "failed",
            CaseVerdict::RuntimeError { .. } => "error",
            CaseVerdict::Timeout => "timeout",
        }
    }
}

/// Overall classification of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Success,
    Partial,
    Failed,
    Error,
}

/// Why a verdict ended in `Error` without running any test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingCode,
    InvalidLimits,
    UnsupportedLanguage,
    SyntaxError,
    Internal,
}

/// Aggregate verdict over all test cases of a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateVerdict {
    pub status: OverallStatus,

    /// Human-readable summary
    pub result: String,

    pub passed: usize,
    pub failed: usize,
    pub total: usize,

    /// One entry per test case, in input order
    pub details: Vec<CaseVerdict>,

    /// Set for verdicts that never got to run test cases
    pub error: Option<ErrorKind>,
}

impl AggregateVerdict {
    /// Build a verdict from per-case results, in input order
    pub fn from_details(details: Vec<CaseVerdict>) -> Self {
        let total = details.len();
        let passed = details.iter().filter(|v| v.is_passed()).count();
        let failed = total - passed;

        let (status, result) = if failed == 0 && passed > 0 {
            (
                OverallStatus::Success,
                format!("All tests passed ({passed}/{total})"),
            )
        } else if passed > 0 {
            (
                OverallStatus::Partial,
                format!("Passed {passed} of {total} tests"),
            )
        } else {
            (OverallStatus::Failed, format!("Failed {failed} tests"))
        };

        Self {
            status,
            result,
            passed,
            failed,
            total,
            details,
            error: None,
        }
    }

    /// Verdict for code that parsed but had no test cases to run against
    pub fn syntax_ok() -> Self {
        Self {
            status: OverallStatus::Success,
            result: "Code compiled successfully (no test cases)".to_owned(),
            passed: 0,
            failed: 0,
            total: 0,
            details: Vec::new(),
            error: None,
        }
    }

    /// Verdict that ran no test cases because of `kind`
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: OverallStatus::Error,
            result: message.into(),
            passed: 0,
            failed: 0,
            total: 0,
            details: Vec::new(),
            error: Some(kind),
        }
    }
}

struct IndexedCase<'a>(usize, &'a CaseVerdict);

impl Serialize for IndexedCase<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let IndexedCase(index, verdict) = self;
        let mut s = serializer.serialize_struct("CaseReport", 4)?;
        s.serialize_field("test_case", &(index + 1))?;
        s.serialize_field("status", verdict.tag())?;
        match verdict {
            CaseVerdict::Passed => {}
            CaseVerdict::Failed { expected, actual } => {
                s.serialize_field("expected", expected)?;
                s.serialize_field("actual", actual)?;
            }
            CaseVerdict::RuntimeError { message } => s.serialize_field("error", message)?,
            CaseVerdict::Timeout => s.serialize_field("error", crate::types::TIMEOUT_MESSAGE)?,
        }
        s.end()
    }
}

impl Serialize for AggregateVerdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.error.is_some() { 7 } else { 6 };
        let mut s = serializer.serialize_struct("AggregateVerdict", fields)?;
        s.serialize_field("status", &self.status)?;
        s.serialize_field("result", &self.result)?;
        let details: Vec<IndexedCase<'_>> = self
            .details
            .iter()
            .enumerate()
            .map(|(i, v)| IndexedCase(i, v))
            .collect();
        s.serialize_field("details", &details)?;
        s.serialize_field("passed", &self.passed)?;
        s.serialize_field("failed", &self.failed)?;
        s.serialize_field("total", &self.total)?;
        if let Some(kind) = self.error {
            s.serialize_field("error", &kind)?;
        }
        s.end()
    }
}
