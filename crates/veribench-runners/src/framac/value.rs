//! Frama-C value analysis (Eva) runner
//!
//! Runs `frama-c -val -metrics`. Alarms are the abstract interpreter's
//! potential runtime errors; `valid` statuses count as established proofs.

use super::{completion_status, PROGRAM, VERSION_FLAG};
use crate::config::RunnerConfig;
use crate::execution::{self, CompletedRun};
use crate::patterns::PatternTable;
use crate::result::{ExperimentResult, Metric, ResultSummary, ToolMetrics};
use crate::traits::{HealthStatus, RunnerError, ToolId, VerificationRunner};
use crate::util::{bounded_seconds, lines_mentioning};
use async_trait::async_trait;
use std::path::Path;

const ARGS: &[&str] = &["-val", "-metrics"];

const PATTERNS: &[(Metric, &str)] = &[
    (Metric::AlarmsGenerated, "assertion|alarm"),
    (Metric::ProofsEstablished, "valid"),
];

/// Frama-C value analysis runner
pub struct FramaCValueRunner {
    config: RunnerConfig,
    patterns: PatternTable,
}

impl Default for FramaCValueRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FramaCValueRunner {
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        let patterns = PatternTable::new(PATTERNS, &config.extra_patterns);
        Self { config, patterns }
    }

    fn finish(&self, benchmark: &str, run: CompletedRun) -> ExperimentResult {
        let mut summary = ResultSummary::with_status(completion_status(run.exit_code));
        summary.alarms = lines_mentioning(&run.stdout, &["assertion", "alarm"]);
        summary.details = metric_lines(&run.stdout);

        let mut metrics = ToolMetrics::default();
        self.patterns.apply(&run.stdout, &mut metrics);

        ExperimentResult {
            tool: ToolId::FramaCValue,
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

/// `key: value` lines of the `-metrics` report that mention time, memory
/// or proofs
fn metric_lines(stdout: &str) -> std::collections::BTreeMap<String, String> {
    stdout
        .lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            ["time", "memory", "proof"].iter().any(|k| lower.contains(k))
        })
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            let key = key.trim();
            (!key.is_empty()).then(|| (key.to_string(), value.trim().to_string()))
        })
        .collect()
}

#[async_trait]
impl VerificationRunner for FramaCValueRunner {
    fn id(&self) -> ToolId {
        ToolId::FramaCValue
    }

    async fn run_verification(
        &self,
        benchmark: &Path,
        output_dir: &Path,
    ) -> Result<ExperimentResult, RunnerError> {
        execution::run_backend(
            ToolId::FramaCValue,
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
