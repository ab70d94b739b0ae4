//! Frama-C WP runner
//!
//! Runs `frama-c -wp -wp-rte`: deductive verification of ACSL contracts
//! plus generated runtime-error guards. Goals are counted from the
//! per-goal `Proved` / `Failed` lines.

use super::{completion_status, PROGRAM, VERSION_FLAG};
use crate::config::RunnerConfig;
use crate::execution::{self, CompletedRun};
use crate::patterns::PatternTable;
use crate::result::{ExperimentResult, Metric, ResultSummary, ToolMetrics};
use crate::traits::{HealthStatus, RunnerError, ToolId, VerificationRunner};
use crate::util::bounded_seconds;
use async_trait::async_trait;
use std::path::Path;

const ARGS: &[&str] = &["-wp", "-wp-rte"];

const PATTERNS: &[(Metric, &str)] = &[
    (Metric::GoalsProven, "Proved"),
    (Metric::GoalsFailed, "Failed"),
];

/// Frama-C WP runner
pub struct FramaCWpRunner {
    config: RunnerConfig,
    patterns: PatternTable,
}

impl Default for FramaCWpRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FramaCWpRunner {
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        let patterns = PatternTable::new(PATTERNS, &config.extra_patterns);
        Self { config, patterns }
    }

    fn finish(&self, benchmark: &str, run: CompletedRun) -> ExperimentResult {
        let mut metrics = ToolMetrics::default();
        self.patterns.apply(&run.stdout, &mut metrics);

        ExperimentResult {
            tool: ToolId::FramaCWp,
            benchmark: benchmark.to_string(),
            success: run.exited_cleanly(),
            execution_time: bounded_seconds(run.elapsed, self.config.timeout),
            return_code: run.exit_code,
            result: ResultSummary::with_status(completion_status(run.exit_code)),
            stdout: run.stdout,
            stderr: run.stderr,
            metrics,
            error: None,
        }
    }
}

#[async_trait]
impl VerificationRunner for FramaCWpRunner {
    fn id(&self) -> ToolId {
        ToolId::FramaCWp
    }

    async fn run_verification(
        &self,
        benchmark: &Path,
        output_dir: &Path,
    ) -> Result<ExperimentResult, RunnerError> {
        execution::run_backend(
            ToolId::FramaCWp,
            &self.config,
            PROGRAM,
            ARGS,
            benchmark,
            output_dir,
            |name, run| self.finish(name, run),
        )
        .await
    }

    async fn health_check(&self) -> HealthStatus {
        let invocation = self.config.launcher.probe(PROGRAM, &[VERSION_FLAG]);
        execution::probe(&invocation, "Frama-C").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternSpec;
    use crate::result::ResultStatus;
    use std::time::Duration;

    const WP_OUTPUT: &str = "\
[wp] 12 goals scheduled
[wp] [Alt-Ergo 2.5.2] Goal typed_set_speed_ensures : Proved (Qed:1ms) (20ms)
[wp] [Alt-Ergo 2.5.2] Goal typed_set_speed_assert_rte_signed_overflow : Proved (12ms)
[wp] [Alt-Ergo 2.5.2] Goal typed_brake_ensures : Failed
[wp] Proved goals:   10 / 12
";

    fn run(exit_code: i32) -> CompletedRun {
        CompletedRun {
            exit_code,
            stdout: WP_OUTPUT.to_string(),
            stderr: String::new(),
            elapsed: Duration::from_secs(3),
        }
    }

    #[test]
    fn test_finish_counts_goal_lines() {
        let runner = FramaCWpRunner::new();
        let result = runner.finish("cruise_control.c", run(0));
        assert!(result.success);
        assert_eq!(result.status(), ResultStatus::Completed);
        assert_eq!(result.metrics.goals_proven, Some(3));
        assert_eq!(result.metrics.goals_failed, Some(1));
        assert_eq!(result.execution_time, 3.0);
    }

    #[test]
    fn test_extra_patterns_extend_table() {
        let runner = FramaCWpRunner::with_config(RunnerConfig {
            extra_patterns: vec![PatternSpec::new(Metric::GoalsFailed, r"Timeout \(")],
            ..RunnerConfig::default()
        });
        let mut run = run(0);
        run.stdout.push_str("[wp] Goal typed_loop_inv : Timeout (Qed:2ms) (10s)\n");
        let result = runner.finish("cruise_control.c", run);
        assert_eq!(result.metrics.goals_failed, Some(2));
    }

    #[test]
    fn test_nonzero_exit() {
        let runner = FramaCWpRunner::new();
        let result = runner.finish("cruise_control.c", run(125));
        assert!(!result.success);
        assert_eq!(result.status(), ResultStatus::Unknown);
    }
}
