use casejudge::{ErrorKind, InMemoryProblemStore, OverallStatus, SyntaxCheck, VerificationRequest};
use casejudge::RunnerRegistry;

use super::{fixture_source, test_config, test_verifier};

#[tokio::test]
async fn test_valid_source_passes_syntax_check() {
    let runner = RunnerRegistry::from_config(&test_config())
        .get("python")
        .unwrap();
    assert_eq!(
        runner.check_syntax(&fixture_source("two.py")).await,
        SyntaxCheck::Valid
    );
}

#[tokio::test]
async fn test_syntax_check_does_not_execute() {
    let runner = RunnerRegistry::from_config(&test_config())
        .get("python")
        .unwrap();
    // Would hang if executed
    assert_eq!(
        runner.check_syntax(&fixture_source("infinite_loop.py")).await,
        SyntaxCheck::Valid
    );
}

#[tokio::test]
async fn test_invalid_source_fails_syntax_check() {
    let runner = RunnerRegistry::from_config(&test_config())
        .get("python")
        .unwrap();
    match runner.check_syntax(&fixture_source("syntax_error.py")).await {
        SyntaxCheck::Invalid { diagnostic } => assert!(!diagnostic.is_empty()),
        other => panic!("expected Invalid, got {other:?}"),
    }
}

#[tokio::test]
async fn test_no_cases_valid_code_is_success() {
    let verifier = test_verifier(InMemoryProblemStore::new());
    let verdict = verifier
        .verify(&VerificationRequest::new(fixture_source("two.py")))
        .await;

    assert_eq!(verdict.status, OverallStatus::Success);
    assert_eq!(verdict.total, 0);
    assert_eq!(verdict.result, "Code compiled successfully (no test cases)");
}

#[tokio::test]
async fn test_no_cases_invalid_code_is_error() {
    let verifier = test_verifier(InMemoryProblemStore::new());
    let verdict = verifier
        .verify(&VerificationRequest::new(fixture_source("syntax_error.py")))
        .await;

    assert_eq!(verdict.status, OverallStatus::Error);
    assert_eq!(verdict.error, Some(ErrorKind::SyntaxError));
    assert!(verdict.result.starts_with("Syntax error: "));
}

#[tokio::test]
async fn test_unknown_problem_falls_back_to_syntax_check() {
    let verifier = test_verifier(InMemoryProblemStore::new());
    let request = VerificationRequest::new(fixture_source("two.py")).with_problem("missing");
    let verdict = verifier.verify(&request).await;

    assert_eq!(verdict.status, OverallStatus::Success);
    assert_eq!(verdict.total, 0);
}
