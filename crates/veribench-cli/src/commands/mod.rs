//! CLI command implementations
//!
//! Each command is in its own module.

pub mod analyze;
pub mod check_tools;
pub mod run;
pub mod setup;

pub use analyze::{run_analyze, AnalyzeConfig};
pub use check_tools::run_check_tools;
pub use run::{run_batch, RunConfig};
pub use setup::run_setup;
