//! `veribench.toml` settings
//!
//! Every key is optional. Directory flags and environment variables given
//! on the command line override the file; see `main.rs`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use veribench_dispatcher::{CompatibilityTable, RunnerRegistry};
use veribench_runners::util::expand_home_dir;
use veribench_runners::{docker_launcher, Launcher, Metric, PatternSpec, RunnerConfig, ToolId};

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "veribench.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unknown tool `{0}` in [tools]")]
    UnknownTool(String),
}

/// How backends are launched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LauncherKind {
    #[default]
    Direct,
    DockerCompose,
}

/// One extra metric pattern
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternEntry {
    pub metric: Metric,
    pub pattern: String,
}

/// `[tools.<id>]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolSection {
    /// Executable override for the direct launcher
    pub program: Option<String>,
    pub extra_args: Vec<String>,
    pub extra_patterns: Vec<PatternEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub corpus_dir: PathBuf,
    pub results_dir: PathBuf,
    pub timeout_secs: u64,
    pub max_concurrent: usize,
    pub launcher: LauncherKind,
    /// Host directory mounted into compose services
    pub workspace_root: PathBuf,
    pub tools: BTreeMap<String, ToolSection>,
    /// Replaces the built-in compatibility table when present
    pub compatibility: Option<BTreeMap<String, Vec<ToolId>>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("benchmarks"),
            results_dir: PathBuf::from("results"),
            timeout_secs: veribench_runners::DEFAULT_TIMEOUT.as_secs(),
            max_concurrent: 1,
            launcher: LauncherKind::Direct,
            workspace_root: PathBuf::from("."),
            tools: BTreeMap::new(),
            compatibility: None,
        }
    }
}

impl Settings {
    /// Load settings from `explicit`, or from [`DEFAULT_CONFIG_FILE`] if it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    debug!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let settings = Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        settings.validate()?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Reject `[tools]` keys that name no runner
    pub fn validate(&self) -> Result<(), ConfigError> {
        for key in self.tools.keys() {
            key.parse::<ToolId>()
                .map_err(|_| ConfigError::UnknownTool(key.clone()))?;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.results_dir.join(veribench_dispatcher::RAW_DIR)
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.results_dir.join("processed")
    }

    fn tool_section(&self, tool: ToolId) -> Option<&ToolSection> {
        self.tools
            .iter()
            .find(|(key, _)| key.parse::<ToolId>().ok() == Some(tool))
            .map(|(_, section)| section)
    }

    /// Runner configuration for `tool`
    pub fn runner_config(&self, tool: ToolId) -> RunnerConfig {
        let section = self.tool_section(tool).cloned().unwrap_or_default();
        let launcher = match self.launcher {
            LauncherKind::Direct => Launcher::Direct {
                program: section
                    .program
                    .as_deref()
                    .and_then(expand_home_dir),
            },
            LauncherKind::DockerCompose => {
                let root = expand_home_dir(&self.workspace_root.to_string_lossy())
                    .unwrap_or_else(|| self.workspace_root.clone());
                docker_launcher(tool, root)
            }
        };

        RunnerConfig {
            launcher,
            timeout: self.timeout(),
            extra_args: section.extra_args,
            extra_patterns: section
                .extra_patterns
                .into_iter()
                .map(|entry| PatternSpec::new(entry.metric, entry.pattern))
                .collect(),
        }
    }

    /// One runner per tool id, configured from these settings
    pub fn registry(&self) -> RunnerRegistry {
        RunnerRegistry::with_all(|tool| self.runner_config(tool))
    }

    pub fn compatibility_table(&self) -> CompatibilityTable {
        match &self.compatibility {
            Some(entries) => CompatibilityTable::from_entries(entries.clone()),
            None => CompatibilityTable::standard(),
        }
    }
}
