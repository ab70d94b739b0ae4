//! Backend process execution
//!
//! Spawns one external process per invocation, captures both output
//! streams, and enforces the wall-clock bound. On expiry the child is
//! killed (`kill_on_drop`) and nothing else is affected.

use crate::config::{Invocation, RunnerConfig};
use crate::result::ExperimentResult;
use crate::traits::{HealthStatus, RunnerError, ToolId};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Timeout for `--version` style health probes
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Captured output of a backend that exited on its own
#[derive(Debug, Clone)]
pub struct CompletedRun {
    /// Exit code, or -1 when the process was terminated by a signal
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl CompletedRun {
    #[must_use]
    pub fn exited_cleanly(&self) -> bool {
        self.exit_code == 0
    }
}

/// What happened to a spawned backend
#[derive(Debug)]
pub enum ProcessOutcome {
    Completed(CompletedRun),
    TimedOut,
    Failed(RunnerError),
}

/// Run `invocation` bounded by `timeout`
pub async fn run_invocation(
    invocation: &Invocation,
    timeout: Duration,
    working_dir: Option<&Path>,
) -> ProcessOutcome {
    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    debug!("Running: {}", invocation.display());
    let start = Instant::now();

    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => {
            let run = CompletedRun {
                exit_code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                elapsed: start.elapsed(),
            };
            debug!(
                "{} exited with {} after {:?} ({} bytes stdout, {} bytes stderr)",
                invocation.program.display(),
                run.exit_code,
                run.elapsed,
                run.stdout.len(),
                run.stderr.len()
            );
            ProcessOutcome::Completed(run)
        }
        Ok(Err(e)) => ProcessOutcome::Failed(RunnerError::Spawn(format!(
            "{}: {}",
            invocation.program.display(),
            e
        ))),
        Err(_) => {
            warn!(
                "{} exceeded {:?}, killing process",
                invocation.program.display(),
                timeout
            );
            ProcessOutcome::TimedOut
        }
    }
}

/// Drive one backend invocation from path checks to a finished result
///
/// `finish` turns a completed process into the runner-specific result;
/// timeouts and invocation errors are handled here identically for every
/// backend.
pub(crate) async fn run_backend<F>(
    tool: ToolId,
    config: &RunnerConfig,
    program: &str,
    builtin_args: &[&str],
    benchmark: &Path,
    output_dir: &Path,
    finish: F,
) -> Result<ExperimentResult, RunnerError>
where
    F: FnOnce(&str, CompletedRun) -> ExperimentResult,
{
    let benchmark = resolve_benchmark(benchmark)?;
    let name = benchmark_name(&benchmark);

    let invocation = match config.launcher.invocation(
        program,
        &config.tool_args(builtin_args),
        &benchmark,
    ) {
        Ok(invocation) => invocation,
        Err(e) => return Ok(ExperimentResult::invocation_error(tool, name, e.to_string())),
    };

    let working_dir = config.launcher.working_dir(output_dir);
    let result = match run_invocation(&invocation, config.timeout, working_dir).await {
        ProcessOutcome::Completed(run) => finish(&name, run),
        ProcessOutcome::TimedOut => ExperimentResult::timeout(tool, name, config.timeout),
        ProcessOutcome::Failed(e) => ExperimentResult::invocation_error(tool, name, e.to_string()),
    };

    info!(
        "{} on {} finished in {:.2}s: {}",
        tool,
        result.benchmark,
        result.execution_time,
        result.status()
    );
    Ok(result)
}

/// Probe a backend by running it with `probe_args`
pub(crate) async fn probe(invocation: &Invocation, name: &str) -> HealthStatus {
    match run_invocation(invocation, PROBE_TIMEOUT, None).await {
        ProcessOutcome::Completed(run) if run.exited_cleanly() => {
            let version = run.stdout.lines().next().unwrap_or_default().trim().to_string();
            debug!("{} available: {}", name, version);
            HealthStatus::Healthy
        }
        ProcessOutcome::Completed(run) => HealthStatus::Degraded {
            reason: format!("{} returned exit code {}", name, run.exit_code),
        },
        ProcessOutcome::TimedOut => HealthStatus::Degraded {
            reason: format!("{} did not answer within {:?}", name, PROBE_TIMEOUT),
        },
        ProcessOutcome::Failed(e) => HealthStatus::Unavailable {
            reason: format!("{} not found: {}", name, e),
        },
    }
}

fn resolve_benchmark(benchmark: &Path) -> Result<PathBuf, RunnerError> {
    if !benchmark.is_file() {
        return Err(RunnerError::BenchmarkNotFound(benchmark.to_path_buf()));
    }
    std::fs::canonicalize(benchmark)
        .map_err(|_| RunnerError::BenchmarkNotFound(benchmark.to_path_buf()))
}

/// Benchmark identifier: the file name
#[must_use]
pub fn benchmark_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
