//! Verification runner implementations
//!
//! Each backend implements the [`VerificationRunner`] trait and turns one
//! external tool invocation into an [`ExperimentResult`].
//!
//! # Runners
//!
//! - **CBMC**: bounded model checking of C programs (`cbmc --json-ui`)
//! - **Frama-C value**: abstract interpretation via the Eva plugin
//! - **Frama-C WP**: deductive verification of ACSL contracts
//! - **E-ACSL**: runtime assertion instrumentation
//!
//! Runners can launch their backend directly or through a
//! `docker compose` service (see [`Launcher`]).

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_precision_loss)] // match counts to f64 for averages
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod cbmc;
pub mod config;
pub mod eacsl;
pub mod execution;
pub mod framac;
pub mod patterns;
pub mod result;
pub mod traits;
pub mod util;

pub use cbmc::CbmcRunner;
pub use config::{Invocation, Launcher, RunnerConfig};
pub use eacsl::EacslRunner;
pub use framac::{FramaCValueRunner, FramaCWpRunner};
pub use patterns::{PatternSpec, PatternTable};
pub use result::{ExperimentResult, Metric, ResultStatus, ResultSummary, ToolMetrics};
pub use traits::{HealthStatus, RunnerError, ToolId, VerificationRunner, DEFAULT_TIMEOUT};

use std::path::PathBuf;
use std::sync::Arc;

/// Construct the runner for `tool`
pub fn build_runner(tool: ToolId, config: RunnerConfig) -> Arc<dyn VerificationRunner> {
    match tool {
        ToolId::Cbmc => Arc::new(CbmcRunner::with_config(config)),
        ToolId::FramaCValue => Arc::new(FramaCValueRunner::with_config(config)),
        ToolId::FramaCWp => Arc::new(FramaCWpRunner::with_config(config)),
        ToolId::Eacsl => Arc::new(EacslRunner::with_config(config)),
    }
}

/// Default compose launcher for `tool` with `host_root` mounted at `/workspace`
pub fn docker_launcher(tool: ToolId, host_root: impl Into<PathBuf>) -> Launcher {
    match tool {
        ToolId::Cbmc => CbmcRunner::docker_launcher(host_root),
        ToolId::FramaCValue | ToolId::FramaCWp => framac::docker_launcher(host_root),
        ToolId::Eacsl => EacslRunner::docker_launcher(host_root),
    }
}
