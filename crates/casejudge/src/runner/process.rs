//! Process spawning and I/O capture
//!
//! Spawns a child with a cleared environment, feeds stdin, captures stdout
//! and stderr, and enforces the wall clock limit. On timeout the child is
//! killed and reaped before returning.

use std::collections::HashMap;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use crate::runner::RunError;
use crate::types::{ABNORMAL_EXIT_CODE, ExecutionResult, ResourceLimits};

/// What to run and where
#[derive(Debug)]
pub struct ProcessSpec<'a> {
    /// Program followed by its arguments
    pub command: Vec<String>,
    pub working_dir: &'a Path,
    /// Value of PATH in the child
    pub path: &'a str,
    /// Extra environment variables
    pub env: &'a HashMap<String, String>,
}

/// Run a process to completion or until the time limit
#[instrument(skip(spec, stdin_data), fields(program = spec.command.first().map(String::as_str)))]
pub async fn run_process(
    spec: ProcessSpec<'_>,
    stdin_data: &[u8],
    limits: &ResourceLimits,
) -> Result<ExecutionResult, RunError> {
    let (program, args) = spec.command.split_first().ok_or(RunError::EmptyCommand)?;

    let timeout = limits.timeout();
    let started = Instant::now();
    let deadline = started
        .checked_add(timeout)
        .ok_or(RunError::TimeoutOutOfRange(timeout.as_secs()))?;

    let mut child = Command::new(program)
        .args(args)
        .current_dir(spec.working_dir)
        .env_clear()
        .env("PATH", spec.path)
        .envs(spec.env)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| RunError::SpawnFailed {
            program: program.clone(),
            source,
        })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| RunError::Capture("stdout was not piped".to_owned()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| RunError::Capture("stderr was not piped".to_owned()))?;

    let cap = limits.max_output_bytes();
    let stdin_task = feed_stdin(child.stdin.take(), stdin_data.to_vec());
    let mut stdout_task = tokio::spawn(read_capped(stdout, cap));
    let mut stderr_task = tokio::spawn(read_capped(stderr, cap));

    // Readers are awaited under the same deadline: a grandchild holding the
    // pipes open must not outlive the limit either.
    let finished = tokio::time::timeout_at(deadline, async {
        let status = child.wait().await?;
        let stdout = join_capture(&mut stdout_task).await?;
        let stderr = join_capture(&mut stderr_task).await?;
        Ok::<_, RunError>((status, stdout, stderr))
    })
    .await;

    match finished {
        Ok(outcome) => {
            stdin_task.abort();
            let (status, stdout, stderr) = outcome?;
            let result = completed(status, &stdout, &stderr);
            debug!(
                exit_code = result.exit_code,
                elapsed_ms = started.elapsed().as_millis() as u64,
                stdout_len = result.stdout.len(),
                stderr_len = result.stderr.len(),
                "process exited"
            );
            Ok(result)
        }
        Err(_) => {
            debug!(timeout_secs = timeout.as_secs(), "time limit exceeded, killing process");
            if let Err(e) = child.kill().await {
                warn!(error = %e, "failed to kill timed out process");
            }
            stdin_task.abort();
            stdout_task.abort();
            stderr_task.abort();
            Ok(ExecutionResult::timeout())
        }
    }
}

/// Write stdin in the background so a child that never reads cannot block us
fn feed_stdin(stdin: Option<tokio::process::ChildStdin>, data: Vec<u8>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let Some(mut stdin) = stdin else {
            return;
        };
        if let Err(e) = stdin.write_all(&data).await {
            // Programs are free to exit without reading their input
            debug!(error = %e, "stdin write interrupted");
            return;
        }
        if let Err(e) = stdin.shutdown().await {
            debug!(error = %e, "stdin close failed");
        }
    })
}

/// Read a stream to the end, keeping at most `cap` bytes
async fn read_capped<R>(mut reader: R, cap: Option<usize>) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    match cap {
        Some(cap) => {
            (&mut reader).take(cap as u64).read_to_end(&mut buf).await?;
            let dropped = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
            if dropped > 0 {
                debug!(kept = buf.len(), dropped, "output truncated");
            }
        }
        None => {
            reader.read_to_end(&mut buf).await?;
        }
    }
    Ok(buf)
}

async fn join_capture(
    task: &mut JoinHandle<std::io::Result<Vec<u8>>>,
) -> Result<Vec<u8>, RunError> {
    match task.await {
        Ok(read) => Ok(read?),
        Err(e) => Err(RunError::Capture(e.to_string())),
    }
}

fn completed(status: ExitStatus, stdout: &[u8], stderr: &[u8]) -> ExecutionResult {
    let mut stderr = String::from_utf8_lossy(stderr).into_owned();
    let exit_code = match status.code() {
        Some(code) => code,
        None => {
            // Killed by a signal
            if stderr.is_empty() {
                stderr = format!("process terminated: {status}");
            }
            ABNORMAL_EXIT_CODE
        }
    };

    ExecutionResult {
        stdout: String::from_utf8_lossy(stdout).into_owned(),
        stderr,
        exit_code,
        timed_out: false,
    }
}
