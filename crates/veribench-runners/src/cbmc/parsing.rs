//! CBMC output parsing
//!
//! `cbmc --json-ui` prints a JSON array of message objects. The verdict is
//! carried by an object with a `cProverStatus` key and per-property
//! outcomes by an object with a `result` array. When stdout is not JSON
//! (older CBMC, or extra args that switch the UI off) the plain-text
//! verdict lines are used instead.

use crate::patterns::PatternTable;
use crate::result::{Metric, ResultStatus, ResultSummary, ToolMetrics};
use regex::RegexBuilder;
use serde_json::Value;

pub(super) const VERIFICATION_SUCCESSFUL: &str = "VERIFICATION SUCCESSFUL";
pub(super) const VERIFICATION_FAILED: &str = "VERIFICATION FAILED";

/// Metric patterns counted over stdout when no JSON report is available
pub(super) const PATTERNS: &[(Metric, &str)] = &[
    (Metric::BugsDetected, "VERIFICATION FAILED"),
    (Metric::BugsDetected, "array.*out of bounds"),
    (Metric::BugsDetected, "pointer.*outside"),
    (Metric::BugsDetected, "division by zero"),
    (Metric::BugsDetected, "arithmetic overflow"),
    (Metric::PropertiesVerified, "VERIFICATION SUCCESSFUL"),
];

/// Structured view of a `--json-ui` message stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonReport {
    /// Value of `cProverStatus` (`success` / `failure`), if present
    pub prover_status: Option<String>,
    /// Properties reported with status SUCCESS
    pub passed: Vec<String>,
    /// Properties reported with status FAILURE
    pub failed: Vec<String>,
}

impl JsonReport {
    #[must_use]
    pub fn status(&self) -> ResultStatus {
        match self.prover_status.as_deref() {
            Some("success") => ResultStatus::Safe,
            Some("failure") => ResultStatus::Unsafe,
            _ => ResultStatus::Unknown,
        }
    }

    #[must_use]
    pub fn is_failure_verdict(&self) -> bool {
        self.prover_status.as_deref() == Some("failure")
    }
}

/// Parse stdout as a `--json-ui` stream; `None` when it is not JSON
#[must_use]
pub fn parse_json_report(stdout: &str) -> Option<JsonReport> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value: Value = serde_json::from_str(trimmed).ok()?;
    let messages = match value {
        Value::Array(items) => items,
        Value::Object(_) => vec![value],
        _ => return None,
    };

    let mut report = JsonReport::default();
    for message in &messages {
        if let Some(status) = message.get("cProverStatus").and_then(Value::as_str) {
            report.prover_status = Some(status.to_lowercase());
        }
        let Some(results) = message.get("result").and_then(Value::as_array) else {
            continue;
        };
        for property in results {
            let name = property
                .get("property")
                .and_then(Value::as_str)
                .unwrap_or("<unnamed>")
                .to_string();
            match property.get("status").and_then(Value::as_str) {
                Some(s) if s.eq_ignore_ascii_case("FAILURE") => report.failed.push(name),
                Some(s) if s.eq_ignore_ascii_case("SUCCESS") => report.passed.push(name),
                _ => {}
            }
        }
    }
    Some(report)
}

/// Summary and metrics derived from one CBMC run
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedOutput {
    pub summary: ResultSummary,
    pub metrics: ToolMetrics,
    pub failure_verdict: bool,
}

/// Interpret CBMC output, preferring the JSON report
///
/// `patterns` drives the text fallback. With a JSON report the property
/// counts come from the report and only the user-supplied `extra` rules
/// are counted over stdout, on top of them.
#[must_use]
pub fn parse_output(
    stdout: &str,
    stderr: &str,
    patterns: &PatternTable,
    extra: &PatternTable,
) -> ParsedOutput {
    if let Some(report) = parse_json_report(stdout) {
        let mut summary = ResultSummary::with_status(report.status());
        summary.failed_properties = report.failed.clone();
        summary
            .details
            .insert("report".to_string(), "json".to_string());

        let mut metrics = ToolMetrics::default();
        metrics.set(Metric::BugsDetected, report.failed.len() as u64);
        metrics.set(Metric::PropertiesVerified, report.passed.len() as u64);
        extra.accumulate(stdout, &mut metrics);

        return ParsedOutput {
            summary,
            metrics,
            failure_verdict: report.is_failure_verdict(),
        };
    }

    let combined = format!("{}\n{}", stdout, stderr);
    let status = if combined.contains(VERIFICATION_SUCCESSFUL) {
        ResultStatus::Safe
    } else if combined.contains(VERIFICATION_FAILED) {
        ResultStatus::Unsafe
    } else {
        ResultStatus::Unknown
    };

    let mut summary = ResultSummary::with_status(status);
    summary
        .details
        .insert("report".to_string(), "text".to_string());
    summary.details.insert(
        "errors_found".to_string(),
        count_matches(r"error|violation", &combined).to_string(),
    );
    summary.details.insert(
        "warnings".to_string(),
        count_matches(r"warning", &combined).to_string(),
    );

    let mut metrics = ToolMetrics::default();
    patterns.apply(stdout, &mut metrics);

    ParsedOutput {
        summary,
        metrics,
        failure_verdict: stdout.contains(VERIFICATION_FAILED),
    }
}

fn count_matches(pattern: &str, text: &str) -> usize {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map(|re| re.find_iter(text).count())
        .unwrap_or(0)
}
