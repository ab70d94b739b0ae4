//! Core runner trait and supporting types
//!
//! Every verification backend is wrapped by a type implementing
//! [`VerificationRunner`]. A runner executes one external tool against one
//! benchmark file and normalizes whatever the tool prints into an
//! [`ExperimentResult`].

use crate::result::{ExperimentResult, Metric};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Hard wall-clock bound for a single backend invocation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

// =============================================
// Kani Proofs for ToolId
// =============================================

#[cfg(kani)]
mod kani_proofs {
    use super::*;

    /// Verify every tool id round-trips through its string name
    #[kani::proof]
    fn proof_tool_id_name_round_trip() {
        for tool in ToolId::ALL {
            let parsed = ToolId::from_str(tool.as_str());
            kani::assert(parsed == Ok(tool), "name should parse back to the same id");
        }
    }

    /// Verify every tool populates at least one metric
    #[kani::proof]
    fn proof_tool_id_metrics_non_empty() {
        for tool in ToolId::ALL {
            kani::assert(!tool.metrics().is_empty(), "tool should own metrics");
        }
    }
}

/// Identifier for a verification backend
///
/// The set is closed: adding a backend means adding a variant here, a
/// runner module, and its pattern table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ToolId {
    /// CBMC bounded model checker
    #[serde(rename = "cbmc")]
    Cbmc,
    /// Frama-C value analysis (EVA)
    #[serde(rename = "framac_value")]
    FramaCValue,
    /// Frama-C WP deductive verification
    #[serde(rename = "framac_wp")]
    FramaCWp,
    /// E-ACSL runtime assertion instrumentation
    #[serde(rename = "eacsl")]
    Eacsl,
}

impl ToolId {
    /// All known tools in canonical order
    pub const ALL: [ToolId; 4] = [
        ToolId::Cbmc,
        ToolId::FramaCValue,
        ToolId::FramaCWp,
        ToolId::Eacsl,
    ];

    /// Stable name used in snapshots, CSV exports and configuration
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolId::Cbmc => "cbmc",
            ToolId::FramaCValue => "framac_value",
            ToolId::FramaCWp => "framac_wp",
            ToolId::Eacsl => "eacsl",
        }
    }

    /// Human readable tool name
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            ToolId::Cbmc => "CBMC",
            ToolId::FramaCValue => "Frama-C Value",
            ToolId::FramaCWp => "Frama-C WP",
            ToolId::Eacsl => "E-ACSL",
        }
    }

    /// Count metrics this tool populates on every result it produces
    #[must_use]
    pub fn metrics(&self) -> &'static [Metric] {
        match self {
            ToolId::Cbmc => &[Metric::BugsDetected, Metric::PropertiesVerified],
            ToolId::FramaCValue => &[Metric::AlarmsGenerated, Metric::ProofsEstablished],
            ToolId::FramaCWp => &[Metric::GoalsProven, Metric::GoalsFailed],
            ToolId::Eacsl => &[Metric::RuntimeChecksInserted],
        }
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cbmc" => Ok(ToolId::Cbmc),
            "framac_value" | "framac-value" | "eva" => Ok(ToolId::FramaCValue),
            "framac_wp" | "framac-wp" | "wp" => Ok(ToolId::FramaCWp),
            "eacsl" | "e-acsl" => Ok(ToolId::Eacsl),
            other => Err(format!(
                "Unknown tool: {}. Supported tools: cbmc, framac_value, framac_wp, eacsl",
                other
            )),
        }
    }
}

/// Health status of a backend installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Tool responded normally
    Healthy,
    /// Tool was found but responded abnormally
    Degraded { reason: String },
    /// Tool could not be reached
    Unavailable { reason: String },
}

impl HealthStatus {
    /// True when the tool can be used for experiments
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self, HealthStatus::Unavailable { .. })
    }
}

/// Errors raised by runners
///
/// Only invalid input escapes [`VerificationRunner::run_verification`];
/// backend failures are always folded into an [`ExperimentResult`].
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Benchmark path does not exist or is not a file
    #[error("Benchmark not found: {}", .0.display())]
    BenchmarkNotFound(PathBuf),

    /// Benchmark exists but cannot be handed to the backend
    #[error("Invalid benchmark {}: {reason}", path.display())]
    InvalidBenchmark { path: PathBuf, reason: String },

    /// Backend process could not be started
    #[error("Failed to start backend: {0}")]
    Spawn(String),

    /// Backend exceeded the wall-clock bound
    #[error("Backend timed out after {0:?}")]
    Timeout(Duration),
}

/// Contract shared by every verification backend adapter
#[async_trait]
pub trait VerificationRunner: Send + Sync {
    /// Which backend this runner drives
    fn id(&self) -> ToolId;

    /// Run the backend against one benchmark file
    ///
    /// Backend failures (nonzero exit, unparseable output, crashes,
    /// timeouts) are returned as `Ok` results with `success = false`.
    /// `Err` is reserved for a benchmark path that does not exist.
    async fn run_verification(
        &self,
        benchmark: &Path,
        output_dir: &Path,
    ) -> Result<ExperimentResult, RunnerError>;

    /// Check whether the backend executable is reachable
    async fn health_check(&self) -> HealthStatus;
}
