//! Runner configuration and backend launchers

use crate::patterns::PatternSpec;
use crate::traits::{RunnerError, DEFAULT_TIMEOUT};
use crate::util::expand_home_dir;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// How a backend executable is reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launcher {
    /// Run the executable directly (from `PATH` unless `program` is set)
    Direct { program: Option<PathBuf> },
    /// Run the backend inside a `docker compose` service
    DockerCompose {
        /// Compose service name
        service: String,
        /// Optional `--platform` value
        platform: Option<String>,
        /// Program tokens inside the container (empty when the service
        /// entrypoint is the backend itself)
        exec: Vec<String>,
        /// Host directory mounted into the container
        host_root: PathBuf,
        /// Mount point of `host_root` inside the container
        container_root: String,
    },
}

impl Default for Launcher {
    fn default() -> Self {
        Launcher::Direct { program: None }
    }
}

/// A fully resolved command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    /// Command line rendered for logs
    #[must_use]
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl Launcher {
    /// Compose launcher with the conventional `/workspace` mount
    #[must_use]
    pub fn docker_compose(service: &str, exec: &[&str], host_root: impl Into<PathBuf>) -> Self {
        Launcher::DockerCompose {
            service: service.to_string(),
            platform: None,
            exec: exec.iter().map(|s| (*s).to_string()).collect(),
            host_root: host_root.into(),
            container_root: "/workspace".to_string(),
        }
    }

    /// Build the command line for running a backend on `benchmark`
    ///
    /// `benchmark` must be absolute. For compose launchers it must also
    /// live under `host_root`.
    pub fn invocation(
        &self,
        default_program: &str,
        tool_args: &[String],
        benchmark: &Path,
    ) -> Result<Invocation, RunnerError> {
        match self {
            Launcher::Direct { program } => {
                let mut args = tool_args.to_vec();
                args.push(benchmark.display().to_string());
                Ok(Invocation {
                    program: resolve_program(program.as_deref(), default_program),
                    args,
                })
            }
            Launcher::DockerCompose {
                host_root,
                container_root,
                ..
            } => {
                let target = container_path(host_root, container_root, benchmark)?;
                let mut args = self.compose_prefix();
                args.extend(tool_args.iter().cloned());
                args.push(target);
                Ok(Invocation {
                    program: PathBuf::from("docker"),
                    args,
                })
            }
        }
    }

    /// Command line used for health probes (`<program> <probe_args>`)
    #[must_use]
    pub fn probe(&self, default_program: &str, probe_args: &[&str]) -> Invocation {
        match self {
            Launcher::Direct { program } => Invocation {
                program: resolve_program(program.as_deref(), default_program),
                args: probe_args.iter().map(|s| (*s).to_string()).collect(),
            },
            Launcher::DockerCompose { .. } => {
                let mut args = self.compose_prefix();
                args.extend(probe_args.iter().map(|s| (*s).to_string()));
                Invocation {
                    program: PathBuf::from("docker"),
                    args,
                }
            }
        }
    }

    /// Working directory for the backend process
    #[must_use]
    pub fn working_dir<'a>(&'a self, output_dir: &'a Path) -> Option<&'a Path> {
        match self {
            Launcher::Direct { .. } => output_dir.is_dir().then_some(output_dir),
            // compose resolves docker-compose.yml relative to the mounted root
            Launcher::DockerCompose { host_root, .. } => {
                host_root.is_dir().then_some(host_root.as_path())
            }
        }
    }

    fn compose_prefix(&self) -> Vec<String> {
        let Launcher::DockerCompose {
            service,
            platform,
            exec,
            ..
        } = self
        else {
            return Vec::new();
        };
        let mut args = vec!["compose".to_string(), "run".to_string(), "--rm".to_string()];
        if let Some(platform) = platform {
            args.push("--platform".to_string());
            args.push(platform.clone());
        }
        args.push(service.clone());
        args.extend(exec.iter().cloned());
        args
    }
}

fn resolve_program(configured: Option<&Path>, default_program: &str) -> PathBuf {
    match configured {
        Some(path) => expand_home_dir(&path.to_string_lossy()).unwrap_or_else(|| path.to_path_buf()),
        None => PathBuf::from(default_program),
    }
}

/// Map a host benchmark path to its location inside the container
fn container_path(
    host_root: &Path,
    container_root: &str,
    benchmark: &Path,
) -> Result<String, RunnerError> {
    let root = std::fs::canonicalize(host_root).unwrap_or_else(|_| host_root.to_path_buf());
    let relative = benchmark
        .strip_prefix(&root)
        .map_err(|_| RunnerError::InvalidBenchmark {
            path: benchmark.to_path_buf(),
            reason: format!("not under container mount root {}", root.display()),
        })?;

    let mut target = container_root.trim_end_matches('/').to_string();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            target.push('/');
            target.push_str(&part.to_string_lossy());
        }
    }
    Ok(target)
}

/// Per-runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// How the backend is launched
    pub launcher: Launcher,
    /// Wall-clock bound per invocation
    pub timeout: Duration,
    /// Arguments appended after the built-in tool arguments
    pub extra_args: Vec<String>,
    /// Patterns appended to the built-in metric table
    pub extra_patterns: Vec<PatternSpec>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            launcher: Launcher::default(),
            timeout: DEFAULT_TIMEOUT,
            extra_args: Vec::new(),
            extra_patterns: Vec::new(),
        }
    }
}

impl RunnerConfig {
    /// Built-in tool arguments followed by the configured extras
    #[must_use]
    pub fn tool_args(&self, builtin: &[&str]) -> Vec<String> {
        builtin
            .iter()
            .map(|s| (*s).to_string())
            .chain(self.extra_args.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_runner_config_defaults() {
        let config = RunnerConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(300));
        assert_eq!(config.launcher, Launcher::Direct { program: None });
        assert!(config.extra_args.is_empty());
        assert!(config.extra_patterns.is_empty());
    }

    #[test]
    fn test_direct_invocation_appends_benchmark() {
        let launcher = Launcher::default();
        let args = vec!["-wp".to_string(), "-wp-rte".to_string()];
        let inv = launcher
            .invocation("frama-c", &args, Path::new("/bench/f.c"))
            .unwrap();
        assert_eq!(inv.program, PathBuf::from("frama-c"));
        assert_eq!(inv.args, vec!["-wp", "-wp-rte", "/bench/f.c"]);
        assert_eq!(inv.display(), "frama-c -wp -wp-rte /bench/f.c");
    }

    #[test]
    fn test_direct_invocation_uses_configured_program() {
        let launcher = Launcher::Direct {
            program: Some(PathBuf::from("/opt/cbmc/bin/cbmc")),
        };
        let inv = launcher.invocation("cbmc", &[], Path::new("/b.c")).unwrap();
        assert_eq!(inv.program, PathBuf::from("/opt/cbmc/bin/cbmc"));
    }

    #[test]
    fn test_compose_invocation_maps_into_workspace() {
        let dir = TempDir::new().unwrap();
        let root = std::fs::canonicalize(dir.path()).unwrap();
        let bench = root.join("benchmarks").join("memory_safety").join("a.c");
        let launcher = Launcher::DockerCompose {
            service: "cbmc".to_string(),
            platform: Some("linux/amd64".to_string()),
            exec: Vec::new(),
            host_root: root.clone(),
            container_root: "/workspace/".to_string(),
        };
        let inv = launcher
            .invocation("cbmc", &["--json-ui".to_string()], &bench)
            .unwrap();
        assert_eq!(inv.program, PathBuf::from("docker"));
        assert_eq!(
            inv.args,
            vec![
                "compose",
                "run",
                "--rm",
                "--platform",
                "linux/amd64",
                "cbmc",
                "--json-ui",
                "/workspace/benchmarks/memory_safety/a.c"
            ]
        );
    }

    #[test]
    fn test_compose_invocation_includes_exec_tokens() {
        let dir = TempDir::new().unwrap();
        let root = std::fs::canonicalize(dir.path()).unwrap();
        let launcher = Launcher::docker_compose("framac", &["frama-c"], root.clone());
        let inv = launcher
            .invocation("frama-c", &["-e-acsl".to_string()], &root.join("x.c"))
            .unwrap();
        assert_eq!(
            inv.args,
            vec!["compose", "run", "--rm", "framac", "frama-c", "-e-acsl", "/workspace/x.c"]
        );
    }

    #[test]
    fn test_compose_rejects_benchmark_outside_root() {
        let dir = TempDir::new().unwrap();
        let launcher = Launcher::docker_compose("cbmc", &[], dir.path());
        let err = launcher
            .invocation("cbmc", &[], Path::new("/elsewhere/a.c"))
            .unwrap_err();
        assert!(matches!(err, RunnerError::InvalidBenchmark { .. }));
    }

    #[test]
    fn test_probe_invocation() {
        let launcher = Launcher::default();
        let inv = launcher.probe("cbmc", &["--version"]);
        assert_eq!(inv.display(), "cbmc --version");

        let launcher = Launcher::docker_compose("framac", &["frama-c"], "/srv");
        let inv = launcher.probe("frama-c", &["-version"]);
        assert_eq!(
            inv.args,
            vec!["compose", "run", "--rm", "framac", "frama-c", "-version"]
        );
    }

    #[test]
    fn test_tool_args_appends_extras() {
        let config = RunnerConfig {
            extra_args: vec!["--unwind".to_string(), "10".to_string()],
            ..RunnerConfig::default()
        };
        assert_eq!(
            config.tool_args(&["--json-ui"]),
            vec!["--json-ui", "--unwind", "10"]
        );
    }
}
