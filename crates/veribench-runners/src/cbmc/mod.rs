//! CBMC runner
//!
//! CBMC is a bounded model checker for C. It is run with `--json-ui` and
//! reports bugs (violated properties) and verified properties.
//!
//! `success` means CBMC reached a verdict: either every property holds
//! (exit 0) or a violation was found (exit 10, or a failure verdict in the
//! output). Anything else, including a crash, is `success = false`.
//!
//! See: <https://www.cprover.org/cbmc/>

mod parsing;

pub use parsing::{parse_json_report, JsonReport};

use crate::config::{Launcher, RunnerConfig};
use crate::execution::{self, CompletedRun};
use crate::patterns::PatternTable;
use crate::result::ExperimentResult;
use crate::traits::{HealthStatus, RunnerError, ToolId, VerificationRunner};
use crate::util::bounded_seconds;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// CBMC exit code for "a property was violated"
const EXIT_VERIFICATION_FAILED: i32 = 10;

const PROGRAM: &str = "cbmc";
const ARGS: &[&str] = &["--json-ui"];

/// CBMC runner
pub struct CbmcRunner {
    config: RunnerConfig,
    patterns: PatternTable,
    /// User rules alone, counted over JSON reports
    extra: PatternTable,
}

impl Default for CbmcRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CbmcRunner {
    /// Create a runner with default configuration
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    /// Create a runner with custom configuration
    pub fn with_config(config: RunnerConfig) -> Self {
        let patterns = PatternTable::new(parsing::PATTERNS, &config.extra_patterns);
        let extra = PatternTable::new(&[], &config.extra_patterns);
        Self {
            config,
            patterns,
            extra,
        }
    }

    /// Compose launcher matching the `cbmc` service of the experiment stack
    pub fn docker_launcher(host_root: impl Into<PathBuf>) -> Launcher {
        Launcher::DockerCompose {
            service: "cbmc".to_string(),
            platform: Some("linux/amd64".to_string()),
            exec: Vec::new(),
            host_root: host_root.into(),
            container_root: "/workspace".to_string(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    fn finish(&self, benchmark: &str, run: CompletedRun) -> ExperimentResult {
        let parsed = parsing::parse_output(&run.stdout, &run.stderr, &self.patterns, &self.extra);
        let success = run.exit_code == 0
            || run.exit_code == EXIT_VERIFICATION_FAILED
            || parsed.failure_verdict;

        ExperimentResult {
            tool: ToolId::Cbmc,
            benchmark: benchmark.to_string(),
            success,
            execution_time: bounded_seconds(run.elapsed, self.config.timeout),
            return_code: run.exit_code,
            stdout: run.stdout,
            stderr: run.stderr,
            result: parsed.summary,
            metrics: parsed.metrics,
            error: None,
        }
    }
}

#[async_trait]
impl VerificationRunner for CbmcRunner {
    fn id(&self) -> ToolId {
        ToolId::Cbmc
    }

    async fn run_verification(
        &self,
        benchmark: &Path,
        output_dir: &Path,
    ) -> Result<ExperimentResult, RunnerError> {
        execution::run_backend(
            ToolId::Cbmc,
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
        let invocation = self.config.launcher.probe(PROGRAM, &["--version"]);
        execution::probe(&invocation, "CBMC").await
    }
}
