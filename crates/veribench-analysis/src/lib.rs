//! Experiment result analysis
//!
//! Reads a result snapshot written by the dispatcher and derives summary,
//! performance and effectiveness views plus tool recommendations. The
//! analysis is written to the processed results directory as one JSON
//! document and two CSV tables.
//!
//! Snapshots are never modified here.
//!
//! # Example
//!
//! ```rust,no_run
//! use veribench_analysis::{run_analysis, AnalyzerConfig};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), veribench_analysis::AnalysisError> {
//! let (analysis, paths) = run_analysis(
//!     Path::new("results/raw/latest_results.json"),
//!     Path::new("results/processed"),
//!     &AnalyzerConfig::default(),
//! )?;
//! println!("{} experiments -> {}", analysis.summary.total_experiments, paths.analysis.display());
//! # Ok(())
//! # }
//! ```

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_precision_loss)] // counts to f64 for rates and averages
#![allow(clippy::module_name_repetitions)]

pub mod analyzer;
pub mod export;
pub mod snapshot;
pub mod stats;

pub use analyzer::{
    Analysis, Analyzer, AnalyzerConfig, EffectivenessProfile, PerformanceProfile,
    RecommendationSet, Summary, ToolSummary,
};
pub use export::{
    render_performance_csv, render_results_csv, write_exports, ExportPaths, ANALYSIS_FILE,
    PERFORMANCE_CSV, RESULTS_CSV,
};
pub use snapshot::{load_snapshot, parse_snapshot};

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors from loading a snapshot or writing the exports
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot is not a JSON array of well-formed results
    #[error("Corrupt snapshot {path}: {reason}")]
    CorruptSnapshot { path: PathBuf, reason: String },

    /// Analysis object could not be serialized
    #[error("Export error: {0}")]
    Export(#[from] serde_json::Error),
}

/// Load `snapshot`, analyze it and write every export into `processed_dir`
pub fn run_analysis(
    snapshot: &Path,
    processed_dir: &Path,
    config: &AnalyzerConfig,
) -> Result<(Analysis, ExportPaths), AnalysisError> {
    let results = load_snapshot(snapshot)?;
    let analysis = Analyzer::new(config.clone()).analyze(&results);
    let paths = write_exports(processed_dir, &analysis, &results)?;
    info!(
        "Analyzed {} results from {} into {}",
        results.len(),
        snapshot.display(),
        processed_dir.display()
    );
    Ok((analysis, paths))
}
