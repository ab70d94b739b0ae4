//! Output pattern tables
//!
//! Runners do not parse their backend's native report format for metrics.
//! Instead each runner owns a table mapping case-insensitive regexes to the
//! metric they count. Adding a backend, or refining what a metric counts,
//! is a change to a table rather than to parsing code.

use crate::result::{Metric, ToolMetrics};
use regex::{Regex, RegexBuilder};
use tracing::warn;

/// A user-supplied pattern rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSpec {
    pub metric: Metric,
    pub pattern: String,
}

impl PatternSpec {
    pub fn new(metric: Metric, pattern: impl Into<String>) -> Self {
        Self {
            metric,
            pattern: pattern.into(),
        }
    }
}

/// Compiled metric pattern table
#[derive(Debug, Clone)]
pub struct PatternTable {
    rules: Vec<(Metric, Regex)>,
}

impl PatternTable {
    /// Compile built-in rules followed by `extra` rules
    ///
    /// Rules that fail to compile are skipped with a warning; the rest of
    /// the table stays usable.
    pub fn new(builtin: &[(Metric, &str)], extra: &[PatternSpec]) -> Self {
        let rules = builtin
            .iter()
            .map(|(metric, pattern)| (*metric, *pattern))
            .chain(extra.iter().map(|spec| (spec.metric, spec.pattern.as_str())))
            .filter_map(|(metric, pattern)| {
                match RegexBuilder::new(pattern).case_insensitive(true).build() {
                    Ok(regex) => Some((metric, regex)),
                    Err(e) => {
                        warn!("Skipping invalid pattern {:?} for {:?}: {}", pattern, metric, e);
                        None
                    }
                }
            })
            .collect();
        Self { rules }
    }

    /// Number of compiled rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Total non-overlapping matches of every rule mapped to `metric`
    #[must_use]
    pub fn count(&self, metric: Metric, text: &str) -> u64 {
        self.rules
            .iter()
            .filter(|(m, _)| *m == metric)
            .map(|(_, regex)| regex.find_iter(text).count() as u64)
            .sum()
    }

    /// Set every metric named in the table from `text`, zero included
    pub fn apply(&self, text: &str, metrics: &mut ToolMetrics) {
        for metric in self.metrics() {
            metrics.set(metric, self.count(metric, text));
        }
    }

    /// Add the matches in `text` on top of the values already in `metrics`
    pub fn accumulate(&self, text: &str, metrics: &mut ToolMetrics) {
        for metric in self.metrics() {
            let base = metrics.get(metric).unwrap_or(0);
            metrics.set(metric, base + self.count(metric, text));
        }
    }

    fn metrics(&self) -> Vec<Metric> {
        let mut seen: Vec<Metric> = Vec::new();
        for (metric, _) in &self.rules {
            if !seen.contains(metric) {
                seen.push(*metric);
            }
        }
        seen
    }
}
