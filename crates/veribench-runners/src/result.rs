//! Experiment result schema
//!
//! One [`ExperimentResult`] is produced per (benchmark, tool) invocation
//! attempt and never mutated afterwards. Backend-specific counts live in
//! [`ToolMetrics`], where every field is optional so that readers can tell
//! "this tool never reports that" from "reported zero".

use crate::traits::ToolId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Return code recorded when no process exit status exists
pub const NO_RETURN_CODE: i32 = -1;

/// Outcome tag of a single invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultStatus {
    /// Backend proved all checked properties
    Safe,
    /// Backend reported a property violation
    Unsafe,
    /// Backend exceeded the wall-clock bound
    Timeout,
    /// Backend could not be invoked or the orchestrator caught a fault
    Error,
    /// Analysis ran to completion without a safety verdict
    Completed,
    /// Output did not match any known verdict
    #[default]
    Unknown,
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResultStatus::Safe => "SAFE",
            ResultStatus::Unsafe => "UNSAFE",
            ResultStatus::Timeout => "TIMEOUT",
            ResultStatus::Error => "ERROR",
            ResultStatus::Completed => "COMPLETED",
            ResultStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Count metrics a backend may report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    BugsDetected,
    PropertiesVerified,
    AlarmsGenerated,
    ProofsEstablished,
    GoalsProven,
    GoalsFailed,
    RuntimeChecksInserted,
}

impl Metric {
    /// Every metric, in export column order
    pub const ALL: [Metric; 7] = [
        Metric::BugsDetected,
        Metric::PropertiesVerified,
        Metric::AlarmsGenerated,
        Metric::ProofsEstablished,
        Metric::GoalsProven,
        Metric::GoalsFailed,
        Metric::RuntimeChecksInserted,
    ];

    /// Field name used in snapshots and CSV headers
    #[must_use]
    pub fn field_name(&self) -> &'static str {
        match self {
            Metric::BugsDetected => "bugs_detected",
            Metric::PropertiesVerified => "properties_verified",
            Metric::AlarmsGenerated => "alarms_generated",
            Metric::ProofsEstablished => "proofs_established",
            Metric::GoalsProven => "goals_proven",
            Metric::GoalsFailed => "goals_failed",
            Metric::RuntimeChecksInserted => "runtime_checks_inserted",
        }
    }
}

/// Backend-specific counts attached to a result
///
/// Serialized flat next to the common fields; absent values are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bugs_detected: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties_verified: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarms_generated: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proofs_established: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals_proven: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals_failed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_checks_inserted: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrumentation_success: Option<bool>,
}

impl ToolMetrics {
    /// Metrics with every field owned by `tool` set to zero
    #[must_use]
    pub fn zeroed_for(tool: ToolId) -> Self {
        let mut metrics = ToolMetrics::default();
        for metric in tool.metrics() {
            metrics.set(*metric, 0);
        }
        if tool == ToolId::Eacsl {
            metrics.instrumentation_success = Some(false);
        }
        metrics
    }

    #[must_use]
    pub fn get(&self, metric: Metric) -> Option<u64> {
        match metric {
            Metric::BugsDetected => self.bugs_detected,
            Metric::PropertiesVerified => self.properties_verified,
            Metric::AlarmsGenerated => self.alarms_generated,
            Metric::ProofsEstablished => self.proofs_established,
            Metric::GoalsProven => self.goals_proven,
            Metric::GoalsFailed => self.goals_failed,
            Metric::RuntimeChecksInserted => self.runtime_checks_inserted,
        }
    }

    pub fn set(&mut self, metric: Metric, value: u64) {
        let slot = match metric {
            Metric::BugsDetected => &mut self.bugs_detected,
            Metric::PropertiesVerified => &mut self.properties_verified,
            Metric::AlarmsGenerated => &mut self.alarms_generated,
            Metric::ProofsEstablished => &mut self.proofs_established,
            Metric::GoalsProven => &mut self.goals_proven,
            Metric::GoalsFailed => &mut self.goals_failed,
            Metric::RuntimeChecksInserted => &mut self.runtime_checks_inserted,
        };
        *slot = Some(value);
    }
}

/// Small structured summary of what a backend reported
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    #[serde(default)]
    pub status: ResultStatus,
    /// Alarm lines extracted from the backend output
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alarms: Vec<String>,
    /// Names of properties the backend reported as violated
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_properties: Vec<String>,
    /// Backend-specific key/value extras
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

impl ResultSummary {
    #[must_use]
    pub fn with_status(status: ResultStatus) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }
}

/// Result of one (benchmark, tool) invocation attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub tool: ToolId,
    pub benchmark: String,
    /// Backend reached a conclusive result (see each runner for its definition)
    pub success: bool,
    /// Wall-clock seconds, within `[0, timeout]`
    pub execution_time: f64,
    #[serde(default = "no_return_code")]
    pub return_code: i32,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub result: ResultSummary,
    #[serde(flatten)]
    pub metrics: ToolMetrics,
    /// Fault message for results that never reached the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn no_return_code() -> i32 {
    NO_RETURN_CODE
}

impl ExperimentResult {
    /// Result for a backend that exceeded the wall-clock bound
    ///
    /// `execution_time` is pinned to the bound and all counts are zero.
    #[must_use]
    pub fn timeout(tool: ToolId, benchmark: impl Into<String>, bound: Duration) -> Self {
        Self {
            tool,
            benchmark: benchmark.into(),
            success: false,
            execution_time: bound.as_secs_f64(),
            return_code: NO_RETURN_CODE,
            stdout: String::new(),
            stderr: format!("Timeout after {} seconds", bound.as_secs()),
            result: ResultSummary::with_status(ResultStatus::Timeout),
            metrics: ToolMetrics::zeroed_for(tool),
            error: None,
        }
    }

    /// Result for a backend that could not be invoked
    #[must_use]
    pub fn invocation_error(
        tool: ToolId,
        benchmark: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        Self {
            metrics: ToolMetrics::zeroed_for(tool),
            ..Self::fault(tool, benchmark, message)
        }
    }

    /// Result for a fault caught outside the runner
    ///
    /// Carries no metrics: the backend never produced any output.
    #[must_use]
    pub fn fault(tool: ToolId, benchmark: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            tool,
            benchmark: benchmark.into(),
            success: false,
            execution_time: 0.0,
            return_code: NO_RETURN_CODE,
            stdout: String::new(),
            stderr: format!("Error: {}", message),
            result: ResultSummary::with_status(ResultStatus::Error),
            metrics: ToolMetrics::default(),
            error: Some(message),
        }
    }

    #[must_use]
    pub fn status(&self) -> ResultStatus {
        self.result.status
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.result.status == ResultStatus::Timeout
    }
}
