//! E-ACSL runner
//!
//! E-ACSL is the Frama-C plugin that translates ACSL annotations into C
//! runtime checks. The runner only measures instrumentation: it counts the
//! checks reported while instrumenting and does not compile or execute the
//! instrumented program.

use crate::config::{Launcher, RunnerConfig};
use crate::execution::{self, CompletedRun};
use crate::framac;
use crate::patterns::PatternTable;
use crate::result::{ExperimentResult, Metric, ResultSummary, ToolMetrics};
use crate::traits::{HealthStatus, RunnerError, ToolId, VerificationRunner};
use crate::util::{bounded_seconds, lines_mentioning};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

const ARGS: &[&str] = &["-e-acsl"];

const PATTERNS: &[(Metric, &str)] = &[(Metric::RuntimeChecksInserted, "assertion|check|instrumented")];

/// E-ACSL runner
pub struct EacslRunner {
    config: RunnerConfig,
    patterns: PatternTable,
}

impl Default for EacslRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl EacslRunner {
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        let patterns = PatternTable::new(PATTERNS, &config.extra_patterns);
        Self { config, patterns }
    }

    /// Same compose service as the other Frama-C plugins
    pub fn docker_launcher(host_root: impl Into<PathBuf>) -> Launcher {
        framac::docker_launcher(host_root)
    }

    fn finish(&self, benchmark: &str, run: CompletedRun) -> ExperimentResult {
        let mut summary = ResultSummary::with_status(framac::completion_status(run.exit_code));
        if let Some(line) = lines_mentioning(&run.stdout, &["instrumented"]).pop() {
            summary.details.insert("instrumentation_line".to_string(), line);
        }
        if let Some(line) = lines_mentioning(&run.stdout, &["assertion"]).pop() {
            summary.details.insert("assertions_found".to_string(), line);
        }

        let mut metrics = ToolMetrics::default();
        self.patterns.apply(&run.stdout, &mut metrics);
        metrics.instrumentation_success = Some(run.exited_cleanly());

        ExperimentResult {
            tool: ToolId::Eacsl,
            benchmark: benchmark.to_string(),
            success: run.exited_cleanly(),
            execution_time: bounded_seconds(run.elapsed, self.config.timeout),
            return_code: run.exit_code,
            stdout: run.stdout,
            stderr: run.stderr,
            result: summary,
            metrics,
            error: None,
        }
    }
}

#[async_trait]
impl VerificationRunner for EacslRunner {
    fn id(&self) -> ToolId {
        ToolId::Eacsl
    }

    async fn run_verification(
        &self,
        benchmark: &Path,
        output_dir: &Path,
    ) -> Result<ExperimentResult, RunnerError> {
        execution::run_backend(
            ToolId::Eacsl,
            &self.config,
            framac::PROGRAM,
            ARGS,
            benchmark,
            output_dir,
            |name, run| self.finish(name, run),
        )
        .await
    }

    async fn health_check(&self) -> HealthStatus {
        let invocation = self
            .config
            .launcher
            .probe(framac::PROGRAM, &[framac::VERSION_FLAG]);
        execution::probe(&invocation, "Frama-C (E-ACSL)").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ResultStatus;
    use std::time::Duration;

    const EACSL_OUTPUT: &str = "\
[e-acsl] beginning translation.
[e-acsl] buffer_overflow.c:14: Warning: E-ACSL construct `assertion on array access' is not yet supported.
[e-acsl] translation done in project \"e-acsl\".
[kernel] 4 functions instrumented
";

    fn run(exit_code: i32, stdout: &str) -> CompletedRun {
        CompletedRun {
            exit_code,
            stdout: stdout.to_string(),
            stderr: String::new(),
            elapsed: Duration::from_millis(800),
        }
    }

    #[test]
    fn test_finish_counts_checks_and_records_lines() {
        let runner = EacslRunner::new();
        let result = runner.finish("buffer_overflow.c", run(0, EACSL_OUTPUT));
        assert!(result.success);
        assert_eq!(result.status(), ResultStatus::Completed);
        assert_eq!(result.metrics.runtime_checks_inserted, Some(2));
        assert_eq!(result.metrics.instrumentation_success, Some(true));
        assert_eq!(
            result.result.details["instrumentation_line"],
            "[kernel] 4 functions instrumented"
        );
        assert!(result.result.details["assertions_found"].contains("buffer_overflow.c:14"));
    }

    #[test]
    fn test_failed_instrumentation() {
        let runner = EacslRunner::new();
        let result = runner.finish("buffer_overflow.c", run(1, "[kernel] user error: syntax error\n"));
        assert!(!result.success);
        assert_eq!(result.status(), ResultStatus::Unknown);
        assert_eq!(result.metrics.runtime_checks_inserted, Some(0));
        assert_eq!(result.metrics.instrumentation_success, Some(false));
        assert!(result.result.details.is_empty());
    }

    #[test]
    fn test_docker_launcher_shares_framac_service() {
        assert_eq!(
            EacslRunner::docker_launcher("/srv"),
            framac::docker_launcher("/srv")
        );
    }
}
