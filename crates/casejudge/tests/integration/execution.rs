use std::time::{Duration, Instant};

use casejudge::{LanguageRunner, ResourceLimits, RunnerRegistry};

use super::{fixture_source, test_config};

fn python() -> std::sync::Arc<dyn LanguageRunner> {
    RunnerRegistry::from_config(&test_config())
        .get("python")
        .expect("python not configured")
}

#[tokio::test]
async fn test_run_hello_world() {
    let result = python().run(&fixture_source("hello.py"), "", None).await;

    assert!(result.is_clean());
    assert_eq!(result.stdout, "Hello, World!\n");
}

#[tokio::test]
async fn test_run_with_stdin() {
    let result = python().run(&fixture_source("add.py"), "5 3\n", None).await;

    assert!(result.is_success());
    assert_eq!(result.stdout.trim(), "8");
}

#[tokio::test]
async fn test_run_echo_preserves_input() {
    let input = "line one\nline two\n";
    let result = python().run(&fixture_source("echo.py"), input, None).await;

    assert_eq!(result.stdout, input);
}

#[tokio::test]
async fn test_run_runtime_error() {
    let result = python()
        .run(&fixture_source("runtime_error.py"), "", None)
        .await;

    assert!(!result.is_success());
    assert!(!result.timed_out);
    assert_eq!(result.exit_code, 1);
    assert!(result.stderr.contains("ZeroDivisionError"));
}

#[tokio::test]
async fn test_run_time_limit_exceeded() {
    let started = Instant::now();
    let result = python()
        .run(&fixture_source("infinite_loop.py"), "", None)
        .await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(result.timed_out);
    assert_eq!(result.exit_code, -1);
    assert_eq!(result.stderr, "Timeout");
    assert!(result.stdout.is_empty());
}

#[tokio::test]
async fn test_request_timeout_override() {
    let limits = ResourceLimits::unset().with_timeout_secs(3);
    let started = Instant::now();
    let result = python()
        .run("import time\ntime.sleep(1.5)\nprint('done')\n", "", Some(&limits))
        .await;

    assert!(started.elapsed() >= Duration::from_millis(1500));
    assert!(!result.timed_out);
    assert_eq!(result.stdout.trim(), "done");
}

#[tokio::test]
async fn test_run_is_repeatable() {
    let runner = python();
    let source = fixture_source("add.py");
    let first = runner.run(&source, "2 2\n", None).await;
    let second = runner.run(&source, "2 2\n", None).await;
    assert_eq!(first, second);
}
