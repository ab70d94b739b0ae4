//! Experiment orchestrator
//!
//! Walks the corpus in enumeration order, resolves each benchmark's runners
//! through the compatibility table, and invokes every (benchmark, runner)
//! pair with fault isolation. Each pair ends in exactly one result:
//!
//! ```text
//! PENDING -> RUNNING -> SUCCEEDED | FAILED | TIMED_OUT | ERRORED
//! ```
//!
//! Pairs run on spawned tasks bounded by a semaphore. Finished results go
//! through a channel to one persister task that owns the [`ResultStore`],
//! so the store has a single writer whatever the concurrency. With
//! `max_concurrent = 1` the append order equals the invocation order.

use crate::cancel::CancellationToken;
use crate::compatibility::CompatibilityTable;
use crate::corpus::{Benchmark, Corpus};
use crate::registry::RunnerRegistry;
use crate::store::{ResultStore, StoreError};
use crate::DispatcherError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};
use veribench_runners::{ExperimentResult, ResultStatus, ToolId, VerificationRunner};

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Directory handed to runners as their output directory
    pub output_dir: PathBuf,
    /// Maximum pairs in flight at once
    pub max_concurrent: usize,
}

/// Most pairs allowed in flight; larger requests are clamped to it
pub const MAX_CONCURRENT_LIMIT: usize = Semaphore::MAX_PERMITS / 2;

impl OrchestratorConfig {
    /// `max_concurrent` clamped to `1..=MAX_CONCURRENT_LIMIT`
    #[must_use]
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrent.clamp(1, MAX_CONCURRENT_LIMIT)
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("results").join("raw"),
            max_concurrent: 1,
        }
    }
}

/// Lifecycle of one (benchmark, runner) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PairState {
    Pending,
    Running,
    /// Backend reached a conclusive result
    Succeeded,
    /// Backend ran but did not reach a conclusive result
    Failed,
    TimedOut,
    /// Backend could not be invoked, or the pair faulted
    Errored,
}

impl PairState {
    /// Terminal state described by a finished result
    pub fn of(result: &ExperimentResult) -> PairState {
        match result.status() {
            ResultStatus::Timeout => PairState::TimedOut,
            ResultStatus::Error => PairState::Errored,
            _ if result.success => PairState::Succeeded,
            _ => PairState::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PairState::Pending | PairState::Running)
    }
}

/// One planned invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPair {
    /// 1-based position in the plan
    pub position: usize,
    pub benchmark: Benchmark,
    pub tool: ToolId,
}

/// Outcome counts of a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Pairs resolved from the corpus and compatibility table
    pub planned: usize,
    /// Pairs that produced a result
    pub completed: usize,
    /// Pairs never started because the batch was cancelled
    pub skipped: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub errored: usize,
    /// Appends whose snapshot write failed
    pub persist_failures: usize,
}

impl BatchReport {
    fn record(&mut self, state: PairState) {
        self.completed += 1;
        match state {
            PairState::Succeeded => self.succeeded += 1,
            PairState::Failed => self.failed += 1,
            PairState::TimedOut => self.timed_out += 1,
            PairState::Errored => self.errored += 1,
            PairState::Pending | PairState::Running => {}
        }
    }

    /// Every planned pair reached a terminal state
    pub fn is_complete(&self) -> bool {
        self.completed == self.planned
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} pairs completed ({} succeeded, {} failed, {} timed out, {} errored)",
            self.completed,
            self.planned,
            self.succeeded,
            self.failed,
            self.timed_out,
            self.errored
        )?;
        if self.skipped > 0 {
            write!(f, ", {} skipped", self.skipped)?;
        }
        if self.persist_failures > 0 {
            write!(f, ", {} snapshot writes failed", self.persist_failures)?;
        }
        Ok(())
    }
}

/// Drives a batch of (benchmark, runner) invocations
pub struct Orchestrator {
    registry: RunnerRegistry,
    table: CompatibilityTable,
    config: OrchestratorConfig,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(
        registry: RunnerRegistry,
        table: CompatibilityTable,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            registry,
            table,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that stops scheduling of new pairs when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Resolve every (benchmark, runner) pair, in invocation order
    ///
    /// Unmapped benchmarks contribute no pairs.
    pub fn plan(&self, corpus: &Corpus) -> Vec<PlannedPair> {
        let mut pairs = Vec::new();
        for benchmark in corpus.benchmarks() {
            let tools = self.table.applicable_runners(&benchmark.name);
            if tools.is_empty() {
                debug!("No runners mapped for {}, skipping", benchmark.name);
                continue;
            }
            for tool in tools {
                pairs.push(PlannedPair {
                    position: pairs.len() + 1,
                    benchmark: benchmark.clone(),
                    tool: *tool,
                });
            }
        }
        pairs
    }

    /// Run every planned pair, appending results to `store`
    ///
    /// Per-pair failures never fail the batch; they are recorded as
    /// results. The store is handed back with the report.
    pub async fn run(
        &self,
        corpus: &Corpus,
        store: ResultStore,
    ) -> Result<(BatchReport, ResultStore), DispatcherError> {
        let pairs = self.plan(corpus);
        let total = pairs.len();
        let max_concurrent = self.config.effective_concurrency();
        if max_concurrent != self.config.max_concurrent {
            warn!(
                "max_concurrent {} out of range, using {}",
                self.config.max_concurrent, max_concurrent
            );
        }
        info!(
            "Starting batch: {} pairs over {} benchmarks (max {} concurrent)",
            total,
            corpus.len(),
            max_concurrent
        );

        let (tx, rx) = mpsc::channel::<ExperimentResult>(max_concurrent * 2);
        let persister = tokio::spawn(persist_results(rx, store));

        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let output_dir = Arc::new(self.config.output_dir.clone());
        let mut tasks = JoinSet::new();
        let mut dispatched = 0;

        for pair in pairs {
            if self.cancel.is_cancelled() {
                break;
            }
            let permit = tokio::select! {
                permit = semaphore.clone().acquire_owned() => permit
                    .map_err(|e| DispatcherError::Internal(format!("Scheduler closed: {}", e)))?,
                () = self.cancel.cancelled() => break,
            };
            if self.cancel.is_cancelled() {
                break;
            }

            info!(
                "Running {} on {} ({}/{})",
                pair.tool, pair.benchmark.name, pair.position, total
            );
            dispatched += 1;

            let runner = self.registry.get(pair.tool);
            let output_dir = Arc::clone(&output_dir);
            let tx = tx.clone();
            tasks.spawn(async move {
                let _permit = permit;
                let result = run_pair(runner, &pair, output_dir).await;
                if tx.send(result).await.is_err() {
                    error!("Result persister stopped; dropping result for {}", pair.benchmark.name);
                }
            });
        }
        drop(tx);

        let skipped = total - dispatched;
        if skipped > 0 {
            warn!("Batch cancelled: {} pairs not started", skipped);
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!("Pair task failed: {}", e);
            }
        }

        let (mut report, store) = persister
            .await
            .and_then(|persisted| persisted)
            .map_err(|e| DispatcherError::Internal(format!("Result persister failed: {}", e)))?;
        report.planned = total;
        report.skipped = skipped;

        info!("Batch finished: {}", report);
        Ok((report, store))
    }
}

/// Invoke one pair, converting every fault into an ERROR result
async fn run_pair(
    runner: Option<Arc<dyn VerificationRunner>>,
    pair: &PlannedPair,
    output_dir: Arc<PathBuf>,
) -> ExperimentResult {
    let name = pair.benchmark.name.clone();
    let Some(runner) = runner else {
        error!("No runner registered for {}", pair.tool);
        return ExperimentResult::fault(
            pair.tool,
            name,
            format!("No runner registered for {}", pair.tool),
        );
    };

    let path = pair.benchmark.path.clone();
    let invocation =
        tokio::spawn(async move { runner.run_verification(&path, &output_dir).await });

    match invocation.await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            error!("Error running {} on {}: {}", pair.tool, name, e);
            ExperimentResult::fault(pair.tool, name, e.to_string())
        }
        Err(e) => {
            let message = panic_message(e);
            error!("Error running {} on {}: {}", pair.tool, name, message);
            ExperimentResult::fault(pair.tool, name, message)
        }
    }
}

fn panic_message(err: JoinError) -> String {
    if !err.is_panic() {
        return format!("Runner task cancelled: {}", err);
    }
    let payload = err.into_panic();
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("Runner panicked: {}", detail)
}

/// Single writer lane: append each result and persist the store
///
/// Snapshot writes block on `sync_all`, so each one runs on the blocking
/// pool with the store moved in and handed back.
async fn persist_results(
    mut rx: mpsc::Receiver<ExperimentResult>,
    mut store: ResultStore,
) -> Result<(BatchReport, ResultStore), JoinError> {
    let mut report = BatchReport::default();
    while let Some(result) = rx.recv().await {
        report.record(PairState::of(&result));
        let (returned, outcome) = blocking_write(store, move |s| s.append(result)).await?;
        store = returned;
        if let Err(e) = outcome {
            warn!("Failed to persist results: {}", e);
            report.persist_failures += 1;
        }
    }

    if store.is_empty() {
        let (returned, outcome) = blocking_write(store, |s| s.persist()).await?;
        store = returned;
        if let Err(e) = outcome {
            warn!("Failed to write empty snapshot: {}", e);
            report.persist_failures += 1;
        }
    }
    Ok((report, store))
}

async fn blocking_write<F>(
    mut store: ResultStore,
    write: F,
) -> Result<(ResultStore, Result<(), StoreError>), JoinError>
where
    F: FnOnce(&mut ResultStore) -> Result<(), StoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let outcome = write(&mut store);
        (store, outcome)
    })
    .await
}
