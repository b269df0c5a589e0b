//! Classification of raw execution results

use crate::types::{ExecutionResult, TestCase};
use crate::verdict::{AggregateVerdict, CaseVerdict};

/// Output as it takes part in comparison: surrounding whitespace removed
pub fn normalize_output(output: &str) -> &str {
    output.trim()
}

/// Classify one run against its test case.
///
/// Timeouts are checked before the exit code, so a killed program is never
/// mistaken for a runtime error.
pub fn classify(result: &ExecutionResult, case: &TestCase) -> CaseVerdict {
    if result.timed_out {
        return CaseVerdict::Timeout;
    }
    if result.exit_code != 0 {
        return CaseVerdict::RuntimeError {
            message: result.stderr.clone(),
        };
    }

    let expected = normalize_output(&case.expected_output);
    let actual = normalize_output(&result.stdout);
    if expected == actual {
        CaseVerdict::Passed
    } else {
        CaseVerdict::Failed {
            expected: expected.to_owned(),
            actual: actual.to_owned(),
        }
    }
}

/// Combine per-case verdicts, given in input order
pub fn aggregate(details: Vec<CaseVerdict>) -> AggregateVerdict {
    AggregateVerdict::from_details(details)
}
