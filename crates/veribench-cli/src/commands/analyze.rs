//! Analyze command implementation

use crate::config::Settings;
use std::path::PathBuf;
use veribench_analysis::{run_analysis, Analysis, AnalyzerConfig};
use veribench_dispatcher::LATEST_FILE;

/// Configuration for the analyze command
#[derive(Debug, Clone, Default)]
pub struct AnalyzeConfig {
    /// Snapshot to analyze instead of `raw/latest_results.json`
    pub snapshot: Option<PathBuf>,
}

pub fn run_analyze(
    settings: &Settings,
    config: &AnalyzeConfig,
) -> Result<Analysis, Box<dyn std::error::Error>> {
    let snapshot = config
        .snapshot
        .clone()
        .unwrap_or_else(|| settings.raw_dir().join(LATEST_FILE));
    let analyzer_config = AnalyzerConfig {
        timeout_bound: settings.timeout().as_secs_f64(),
    };

    let (analysis, paths) = run_analysis(&snapshot, &settings.processed_dir(), &analyzer_config)?;
    print_recommendations(&analysis);
    println!("Analysis written to {}", paths.analysis.display());
    Ok(analysis)
}

fn print_recommendations(analysis: &Analysis) {
    let summary = &analysis.summary;
    println!(
        "{} experiments: {} successful, {} failed",
        summary.total_experiments, summary.successful_runs, summary.failed_runs
    );

    let recs = &analysis.tool_recommendations;
    let show = |label: &str, tool: Option<veribench_runners::ToolId>| match tool {
        Some(tool) => println!("  {:<28} {}", label, tool.display_name()),
        None => println!("  {:<28} n/a", label),
    };
    println!("Recommendations:");
    show("Fastest tool:", recs.fastest_tool);
    show("Most effective bug finder:", recs.most_effective_bug_finder);
    show("Best for proofs:", recs.best_for_proofs);
    for (benchmark, tool) in &recs.property_specific {
        println!("  {:<28} {}", format!("{}:", benchmark), tool.display_name());
    }
}
