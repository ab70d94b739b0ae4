//! Results analyzer
//!
//! Derives summary, performance and effectiveness views from a snapshot
//! and ranks runners on them. The analyzer is a pure function of its input:
//! the same snapshot always yields the same [`Analysis`].
//!
//! Per-tool and per-benchmark maps keep first-appearance order, which is
//! also the tie-break order for every recommendation.

use crate::stats;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use veribench_runners::{ExperimentResult, Metric, ToolId, DEFAULT_TIMEOUT};

/// Analyzer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Wall-clock bound the batch ran with, in seconds
    pub timeout_bound: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            timeout_bound: DEFAULT_TIMEOUT.as_secs_f64(),
        }
    }
}

impl AnalyzerConfig {
    /// Execution times at or above this count as timeouts
    pub fn timeout_threshold(&self) -> f64 {
        self.timeout_bound - 1.0
    }
}

/// Per-tool line of the summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSummary {
    pub runs: usize,
    pub success_rate: f64,
    pub avg_time: f64,
    pub total_bugs_detected: u64,
}

/// Whole-snapshot summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_experiments: usize,
    pub successful_runs: usize,
    pub failed_runs: usize,
    pub tools_tested: Vec<ToolId>,
    pub benchmarks_tested: Vec<String>,
    pub average_execution_time: f64,
    pub total_execution_time: f64,
    pub tool_performance: IndexMap<ToolId, ToolSummary>,
}

/// Execution-time statistics of one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceProfile {
    pub mean_execution_time: f64,
    pub median_execution_time: f64,
    pub std_execution_time: f64,
    pub min_execution_time: f64,
    pub max_execution_time: f64,
    pub timeout_count: usize,
}

/// Outcome statistics of one tool
///
/// Metric averages are over the results that report the metric; a tool
/// that never reports one averages 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectivenessProfile {
    pub success_rate: f64,
    pub bugs_detected_avg: f64,
    pub properties_verified_avg: f64,
    pub alarms_generated_avg: f64,
    pub proofs_established_avg: f64,
    pub goals_proven_avg: f64,
    pub goals_failed_avg: f64,
    pub runtime_checks_inserted_avg: f64,
}

/// Derived runner rankings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fastest_tool: Option<ToolId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub most_effective_bug_finder: Option<ToolId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_for_proofs: Option<ToolId>,
    /// Benchmark -> first runner to reach that benchmark's best outcome
    #[serde(default)]
    pub property_specific: IndexMap<String, ToolId>,
}

/// Complete analysis object written to `comprehensive_analysis.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub summary: Summary,
    pub performance_comparison: IndexMap<ToolId, PerformanceProfile>,
    pub effectiveness_comparison: IndexMap<ToolId, EffectivenessProfile>,
    pub tool_recommendations: RecommendationSet,
}

/// Stateless analyzer
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Compute every view of `results`
    pub fn analyze(&self, results: &[ExperimentResult]) -> Analysis {
        let performance = self.performance(results);
        let effectiveness = self.effectiveness(results);
        let recommendations = recommend(&performance, &effectiveness, results);
        Analysis {
            summary: self.summary(results),
            performance_comparison: performance,
            effectiveness_comparison: effectiveness,
            tool_recommendations: recommendations,
        }
    }

    pub fn summary(&self, results: &[ExperimentResult]) -> Summary {
        let times = execution_times(results.iter());
        let successful = results.iter().filter(|r| r.success).count();

        let mut benchmarks_tested: Vec<String> = Vec::new();
        for result in results {
            if !benchmarks_tested.contains(&result.benchmark) {
                benchmarks_tested.push(result.benchmark.clone());
            }
        }

        let groups = group_by_tool(results);
        let tool_performance = groups
            .iter()
            .map(|(tool, group)| {
                let summary = ToolSummary {
                    runs: group.len(),
                    success_rate: success_rate(group),
                    avg_time: stats::mean(&execution_times(group.iter().copied())),
                    total_bugs_detected: group
                        .iter()
                        .filter_map(|r| r.metrics.bugs_detected)
                        .sum(),
                };
                (*tool, summary)
            })
            .collect();

        Summary {
            total_experiments: results.len(),
            successful_runs: successful,
            failed_runs: results.len() - successful,
            tools_tested: groups.keys().copied().collect(),
            benchmarks_tested,
            average_execution_time: stats::mean(&times),
            total_execution_time: stats::sum(&times),
            tool_performance,
        }
    }

    pub fn performance(&self, results: &[ExperimentResult]) -> IndexMap<ToolId, PerformanceProfile> {
        let threshold = self.config.timeout_threshold();
        group_by_tool(results)
            .into_iter()
            .map(|(tool, group)| {
                let times = execution_times(group.iter().copied());
                let profile = PerformanceProfile {
                    mean_execution_time: stats::mean(&times),
                    median_execution_time: stats::median(&times),
                    std_execution_time: stats::sample_std(&times),
                    min_execution_time: stats::min(&times),
                    max_execution_time: stats::max(&times),
                    timeout_count: times.iter().filter(|t| **t >= threshold).count(),
                };
                (tool, profile)
            })
            .collect()
    }

    pub fn effectiveness(
        &self,
        results: &[ExperimentResult],
    ) -> IndexMap<ToolId, EffectivenessProfile> {
        group_by_tool(results)
            .into_iter()
            .map(|(tool, group)| {
                let avg = |metric| metric_mean(&group, metric);
                let profile = EffectivenessProfile {
                    success_rate: success_rate(&group),
                    bugs_detected_avg: avg(Metric::BugsDetected),
                    properties_verified_avg: avg(Metric::PropertiesVerified),
                    alarms_generated_avg: avg(Metric::AlarmsGenerated),
                    proofs_established_avg: avg(Metric::ProofsEstablished),
                    goals_proven_avg: avg(Metric::GoalsProven),
                    goals_failed_avg: avg(Metric::GoalsFailed),
                    runtime_checks_inserted_avg: avg(Metric::RuntimeChecksInserted),
                };
                (tool, profile)
            })
            .collect()
    }
}

/// Rank runners; ties go to the runner seen first in the snapshot
pub fn recommend(
    performance: &IndexMap<ToolId, PerformanceProfile>,
    effectiveness: &IndexMap<ToolId, EffectivenessProfile>,
    results: &[ExperimentResult],
) -> RecommendationSet {
    RecommendationSet {
        fastest_tool: arg_best(performance, |p| p.mean_execution_time, |a, b| a < b),
        most_effective_bug_finder: arg_best(effectiveness, |e| e.bugs_detected_avg, |a, b| a > b),
        best_for_proofs: arg_best(effectiveness, |e| e.properties_verified_avg, |a, b| a > b),
        property_specific: best_per_benchmark(results),
    }
}

/// First key whose score no later key strictly beats
fn arg_best<T>(
    map: &IndexMap<ToolId, T>,
    score: impl Fn(&T) -> f64,
    beats: impl Fn(f64, f64) -> bool,
) -> Option<ToolId> {
    let mut best: Option<(ToolId, f64)> = None;
    for (tool, value) in map {
        let s = score(value);
        match best {
            Some((_, current)) if !beats(s, current) => {}
            _ => best = Some((*tool, s)),
        }
    }
    best.map(|(tool, _)| tool)
}

/// For each benchmark, the first runner whose `success` equals the best
/// `success` recorded for that benchmark
fn best_per_benchmark(results: &[ExperimentResult]) -> IndexMap<String, ToolId> {
    let mut best: IndexMap<String, (bool, ToolId)> = IndexMap::new();
    for result in results {
        match best.get_mut(&result.benchmark) {
            None => {
                best.insert(result.benchmark.clone(), (result.success, result.tool));
            }
            Some(entry) if result.success && !entry.0 => *entry = (true, result.tool),
            Some(_) => {}
        }
    }
    best.into_iter().map(|(bench, (_, tool))| (bench, tool)).collect()
}

fn group_by_tool(results: &[ExperimentResult]) -> IndexMap<ToolId, Vec<&ExperimentResult>> {
    let mut groups: IndexMap<ToolId, Vec<&ExperimentResult>> = IndexMap::new();
    for result in results {
        groups.entry(result.tool).or_default().push(result);
    }
    groups
}

fn execution_times<'a>(results: impl Iterator<Item = &'a ExperimentResult>) -> Vec<f64> {
    results.map(|r| r.execution_time).collect()
}

fn success_rate(group: &[&ExperimentResult]) -> f64 {
    stats::ratio(group.iter().filter(|r| r.success).count(), group.len())
}

fn metric_mean(group: &[&ExperimentResult], metric: Metric) -> f64 {
    let values: Vec<f64> = group
        .iter()
        .filter_map(|r| r.metrics.get(metric))
        .map(|v| v as f64)
        .collect();
    stats::mean(&values)
}
