//! JSON and CSV exports of an analysis

use crate::analyzer::Analysis;
use crate::AnalysisError;
use std::borrow::Cow;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;
use veribench_dispatcher::Category;
use veribench_runners::{ExperimentResult, Metric};

pub const ANALYSIS_FILE: &str = "comprehensive_analysis.json";
pub const RESULTS_CSV: &str = "experiment_results.csv";
pub const PERFORMANCE_CSV: &str = "performance_comparison.csv";

/// Files written by [`write_exports`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub analysis: PathBuf,
    pub results_csv: PathBuf,
    pub performance_csv: PathBuf,
}

/// Write the analysis JSON and both CSV tables into `dir`
pub fn write_exports(
    dir: &Path,
    analysis: &Analysis,
    results: &[ExperimentResult],
) -> Result<ExportPaths, AnalysisError> {
    std::fs::create_dir_all(dir).map_err(|source| AnalysisError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let paths = ExportPaths {
        analysis: dir.join(ANALYSIS_FILE),
        results_csv: dir.join(RESULTS_CSV),
        performance_csv: dir.join(PERFORMANCE_CSV),
    };
    write_file(&paths.analysis, &serde_json::to_string_pretty(analysis)?)?;
    write_file(&paths.results_csv, &render_results_csv(results))?;
    write_file(&paths.performance_csv, &render_performance_csv(analysis))?;

    info!("Analysis exports written to {}", dir.display());
    Ok(paths)
}

fn write_file(path: &Path, contents: &str) -> Result<(), AnalysisError> {
    std::fs::write(path, contents).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// One row per result
pub fn render_results_csv(results: &[ExperimentResult]) -> String {
    let mut out =
        String::from("tool,benchmark,category,success,execution_time,return_code,status");
    for metric in Metric::ALL {
        out.push(',');
        out.push_str(metric.field_name());
    }
    out.push_str(",instrumentation_success,error,stdout,stderr\n");

    for r in results {
        let _ = write!(
            out,
            "{},{},{},{},{},{},{}",
            r.tool,
            quote(&r.benchmark),
            Category::from_benchmark_name(&r.benchmark).label(),
            r.success,
            r.execution_time,
            r.return_code,
            r.status(),
        );
        for metric in Metric::ALL {
            out.push(',');
            if let Some(value) = r.metrics.get(metric) {
                let _ = write!(out, "{}", value);
            }
        }
        out.push(',');
        if let Some(flag) = r.metrics.instrumentation_success {
            let _ = write!(out, "{}", flag);
        }
        let _ = writeln!(
            out,
            ",{},{},{}",
            quote(r.error.as_deref().unwrap_or("")),
            quote(&r.stdout),
            quote(&r.stderr),
        );
    }
    out
}

/// One row per runner aggregate
pub fn render_performance_csv(analysis: &Analysis) -> String {
    let mut out = String::from("tool,mean_time,success_rate,total_runs\n");
    for (tool, perf) in &analysis.performance_comparison {
        let success_rate = analysis
            .effectiveness_comparison
            .get(tool)
            .map_or(0.0, |e| e.success_rate);
        let runs = analysis
            .summary
            .tool_performance
            .get(tool)
            .map_or(0, |t| t.runs);
        let _ = writeln!(
            out,
            "{},{},{},{}",
            tool, perf.mean_execution_time, success_rate, runs
        );
    }
    out
}

/// RFC 4180 field quoting
fn quote(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
