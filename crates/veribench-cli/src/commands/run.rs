//! Run command implementation

use crate::config::Settings;
use tracing::{info, warn};
use veribench_dispatcher::{
    BatchReport, CancellationToken, Corpus, Orchestrator, OrchestratorConfig, ResultStore,
};

/// Overrides given on the `run` command line
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub max_concurrent: Option<usize>,
    pub timeout_secs: Option<u64>,
}

impl RunConfig {
    /// Fold the overrides into `settings`
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(n) = self.max_concurrent {
            settings.max_concurrent = n;
        }
        if let Some(secs) = self.timeout_secs {
            settings.timeout_secs = secs;
        }
    }
}

/// Drive one batch over the corpus and print its report
pub async fn run_batch(
    settings: &Settings,
    cancel: CancellationToken,
) -> Result<BatchReport, Box<dyn std::error::Error>> {
    let corpus = Corpus::discover(&settings.corpus_dir)?;
    let store = ResultStore::open(&settings.results_dir)?;
    info!("Writing results to {}", store.archive_path().display());

    let orchestrator = Orchestrator::new(
        settings.registry(),
        settings.compatibility_table(),
        OrchestratorConfig {
            output_dir: settings.raw_dir(),
            max_concurrent: settings.max_concurrent,
        },
    )
    .with_cancellation_token(cancel);

    let (report, store) = orchestrator.run(&corpus, store).await?;
    if !report.is_complete() {
        warn!("Batch interrupted before every pair ran");
    }
    println!("{}", report);
    println!("Latest snapshot: {}", store.latest_path().display());
    Ok(report)
}
