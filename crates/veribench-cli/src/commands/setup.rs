//! Setup command implementation
//!
//! Creates the results layout and any missing corpus category folders,
//! then reports what the corpus currently holds.

use crate::config::Settings;
use tracing::info;
use veribench_dispatcher::Corpus;

pub fn run_setup(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    for dir in [settings.raw_dir(), settings.processed_dir()] {
        std::fs::create_dir_all(&dir)
            .map_err(|e| format!("Failed to create {}: {}", dir.display(), e))?;
    }

    for created in Corpus::ensure_layout(&settings.corpus_dir)? {
        info!("Created category folder {}", created.display());
    }

    let corpus = Corpus::discover(&settings.corpus_dir)?;
    for (category, count) in corpus.counts_by_category() {
        info!("{}: {} benchmarks", category, count);
    }
    println!(
        "Setup complete: {} benchmarks under {}, results in {}",
        corpus.len(),
        settings.corpus_dir.display(),
        settings.results_dir.display()
    );
    Ok(())
}
