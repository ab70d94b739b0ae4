//! Frama-C family runners
//!
//! Value analysis (Eva) and WP run as `frama-c` plugins. Both share the
//! `frama-c` executable, the `framac` compose service, and the same
//! notion of success: the analysis ran to completion (exit 0).

mod value;
mod wp;

pub use value::FramaCValueRunner;
pub use wp::FramaCWpRunner;

use crate::config::Launcher;
use crate::result::ResultStatus;
use std::path::PathBuf;

pub(crate) const PROGRAM: &str = "frama-c";
pub(crate) const VERSION_FLAG: &str = "-version";

/// Compose launcher for the `framac` service, running `frama-c` inside it
pub fn docker_launcher(host_root: impl Into<PathBuf>) -> Launcher {
    Launcher::docker_compose("framac", &[PROGRAM], host_root)
}

/// Frama-C reports completion only; there is no safety verdict to extract
pub(crate) fn completion_status(exit_code: i32) -> ResultStatus {
    if exit_code == 0 {
        ResultStatus::Completed
    } else {
        ResultStatus::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_status() {
        assert_eq!(completion_status(0), ResultStatus::Completed);
        assert_eq!(completion_status(1), ResultStatus::Unknown);
        assert_eq!(completion_status(-1), ResultStatus::Unknown);
    }

    #[test]
    fn test_docker_launcher_runs_frama_c_in_service() {
        let Launcher::DockerCompose {
            service,
            platform,
            exec,
            container_root,
            ..
        } = docker_launcher("/srv")
        else {
            panic!("expected compose launcher");
        };
        assert_eq!(service, "framac");
        assert!(platform.is_none());
        assert_eq!(exec, vec!["frama-c"]);
        assert_eq!(container_root, "/workspace");
    }
}
