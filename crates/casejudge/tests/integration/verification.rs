use casejudge::{
    CaseVerdict, ErrorKind, InMemoryProblemStore, OverallStatus, ResourceLimits, TestCase,
    VerificationRequest,
};

use super::{fixture_source, test_verifier};

fn with_cases(source: &str, cases: Vec<TestCase>) -> VerificationRequest {
    VerificationRequest::new(fixture_source(source)).with_test_cases(cases)
}

#[tokio::test]
async fn test_correct_answer_passes() {
    let verifier = test_verifier(InMemoryProblemStore::new());
    let verdict = verifier
        .verify(&with_cases("two.py", vec![TestCase::new("", "2")]))
        .await;

    assert_eq!(verdict.status, OverallStatus::Success);
    assert_eq!((verdict.passed, verdict.failed, verdict.total), (1, 0, 1));
    assert_eq!(verdict.details, vec![CaseVerdict::Passed]);
}

#[tokio::test]
async fn test_wrong_answer_fails() {
    let verifier = test_verifier(InMemoryProblemStore::new());
    let verdict = verifier
        .verify(&with_cases("two.py", vec![TestCase::new("", "3")]))
        .await;

    assert_eq!(verdict.status, OverallStatus::Failed);
    assert_eq!(
        verdict.details,
        vec![CaseVerdict::Failed {
            expected: "3".to_owned(),
            actual: "2".to_owned(),
        }]
    );
}

#[tokio::test]
async fn test_out_of_range_timeouts_are_rejected() {
    let verifier = test_verifier(InMemoryProblemStore::new());
    for secs in [0, u64::MAX] {
        let request = with_cases("two.py", vec![TestCase::new("", "2")])
            .with_limits(ResourceLimits::unset().with_timeout_secs(secs));
        let verdict = verifier.verify(&request).await;

        assert_eq!(verdict.status, OverallStatus::Error);
        assert_eq!(verdict.error, Some(ErrorKind::InvalidLimits));
        assert!(verdict.details.is_empty());
    }
}

#[tokio::test]
async fn test_infinite_loop_times_out() {
    let verifier = test_verifier(InMemoryProblemStore::new());
    let verdict = verifier
        .verify(&with_cases("infinite_loop.py", vec![TestCase::new("", "")]))
        .await;

    assert_eq!(verdict.status, OverallStatus::Failed);
    assert_eq!(verdict.details, vec![CaseVerdict::Timeout]);
}

#[tokio::test]
async fn test_runtime_error_carries_stderr() {
    let verifier = test_verifier(InMemoryProblemStore::new());
    let verdict = verifier
        .verify(&with_cases("runtime_error.py", vec![TestCase::new("", "0")]))
        .await;

    assert_eq!(verdict.status, OverallStatus::Failed);
    match &verdict.details[0] {
        CaseVerdict::RuntimeError { message } => assert!(message.contains("ZeroDivisionError")),
        other => panic!("expected RuntimeError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_mixed_results_are_partial_in_order() {
    let verifier = test_verifier(InMemoryProblemStore::new());
    let verdict = verifier
        .verify(&with_cases(
            "add.py",
            vec![TestCase::new("1 1", "2"), TestCase::new("2 2", "5")],
        ))
        .await;

    assert_eq!(verdict.status, OverallStatus::Partial);
    assert_eq!((verdict.passed, verdict.failed, verdict.total), (1, 1, 2));
    assert_eq!(verdict.details[0], CaseVerdict::Passed);
    assert_eq!(
        verdict.details[1],
        CaseVerdict::Failed {
            expected: "5".to_owned(),
            actual: "4".to_owned(),
        }
    );
}

#[tokio::test]
async fn test_stored_problem_in_parallel() {
    let cases: Vec<TestCase> = (0..6)
        .map(|i| TestCase::new(format!("{i} {i}"), (2 * i).to_string()))
        .collect();
    let store = InMemoryProblemStore::new().with_problem("sum", cases);
    let verifier = test_verifier(store).with_max_parallel(3);

    let request = VerificationRequest::new(fixture_source("add.py")).with_problem("sum");
    let verdict = verifier.verify(&request).await;

    assert_eq!(verdict.status, OverallStatus::Success);
    assert_eq!(verdict.total, 6);
    assert_eq!(verdict.result, "All tests passed (6/6)");
}

#[tokio::test]
async fn test_verdict_json_shape() {
    let verifier = test_verifier(InMemoryProblemStore::new());
    let verdict = verifier
        .verify(&with_cases(
            "add.py",
            vec![TestCase::new("1 2", "3"), TestCase::new("oops", "0")],
        ))
        .await;

    let json = serde_json::to_value(&verdict).unwrap();
    assert_eq!(json["status"], "partial");
    assert_eq!(json["details"][0]["test_case"], 1);
    assert_eq!(json["details"][0]["status"], "passed");
    assert_eq!(json["details"][1]["test_case"], 2);
    assert_eq!(json["details"][1]["status"], "error");
    assert!(json["details"][1]["error"].as_str().unwrap().contains("ValueError"));
}
