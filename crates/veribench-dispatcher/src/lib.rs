//! Experiment dispatcher
//!
//! This crate turns a benchmark corpus and a set of verification runners
//! into a persisted batch of [`ExperimentResult`](veribench_runners::ExperimentResult)s.
//!
//! # Components
//!
//! - **Corpus**: enumerates benchmark files by category folder
//! - **CompatibilityTable**: which runners apply to which benchmark
//! - **RunnerRegistry**: runner instances keyed by tool id
//! - **ResultStore**: append-only, crash-safe snapshot files
//! - **Orchestrator**: fault-isolated walk over (benchmark, runner) pairs
//!
//! # Example
//!
//! ```rust,no_run
//! use veribench_dispatcher::{
//!     CompatibilityTable, Corpus, Orchestrator, OrchestratorConfig, ResultStore, RunnerRegistry,
//! };
//! use veribench_runners::RunnerConfig;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let corpus = Corpus::discover(Path::new("benchmarks"))?;
//! let registry = RunnerRegistry::with_all(|_| RunnerConfig::default());
//! let orchestrator = Orchestrator::new(
//!     registry,
//!     CompatibilityTable::standard(),
//!     OrchestratorConfig::default(),
//! );
//! let store = ResultStore::open(Path::new("results"))?;
//! let (report, _store) = orchestrator.run(&corpus, store).await?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]

pub mod cancel;
pub mod compatibility;
pub mod corpus;
pub mod orchestrator;
pub mod registry;
pub mod store;

pub use cancel::CancellationToken;
pub use compatibility::CompatibilityTable;
pub use corpus::{Benchmark, Category, Corpus, CorpusError};
pub use orchestrator::{
    BatchReport, Orchestrator, OrchestratorConfig, PairState, PlannedPair, MAX_CONCURRENT_LIMIT,
};
pub use registry::RunnerRegistry;
pub use store::{ResultStore, StoreError, LATEST_FILE, RAW_DIR};

use thiserror::Error;

/// Errors from the dispatcher
///
/// None of these is raised for a single pair's failure; those become
/// results.
#[derive(Error, Debug)]
pub enum DispatcherError {
    /// Result store could not be opened or written
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Corpus could not be enumerated
    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    /// Scheduler or persister task failed
    #[error("Internal error: {0}")]
    Internal(String),
}
