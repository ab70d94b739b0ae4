//! Append-only result store
//!
//! Holds every [`ExperimentResult`] of a batch in invocation order and
//! rewrites two snapshot files after each append: an archival
//! `experiment_results_<stamp>.json` and `latest_results.json`. Both are
//! written atomically, so a reader never sees a half-written array and a
//! crash loses at most the in-flight result.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use veribench_runners::ExperimentResult;

/// File name of the snapshot consumed by the analyzer
pub const LATEST_FILE: &str = "latest_results.json";

/// Sub-directory of the results root holding snapshots
pub const RAW_DIR: &str = "raw";

/// Errors raised by the result store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Corrupt snapshot {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// In-memory result list mirrored to disk after every append
#[derive(Debug)]
pub struct ResultStore {
    archive_path: PathBuf,
    latest_path: PathBuf,
    results: Vec<ExperimentResult>,
}

impl ResultStore {
    /// Open a store under `<results_dir>/raw`, stamped with the local time
    pub fn open(results_dir: &Path) -> Result<Self, StoreError> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        Self::open_with_stamp(results_dir, &stamp)
    }

    /// Open a store with an explicit archival stamp
    pub fn open_with_stamp(results_dir: &Path, stamp: &str) -> Result<Self, StoreError> {
        let raw_dir = results_dir.join(RAW_DIR);
        std::fs::create_dir_all(&raw_dir).map_err(io_error(&raw_dir))?;
        Ok(Self {
            archive_path: raw_dir.join(format!("experiment_results_{}.json", stamp)),
            latest_path: raw_dir.join(LATEST_FILE),
            results: Vec::new(),
        })
    }

    /// Append one result and persist the whole list
    ///
    /// The record is kept in memory even when persisting fails; the next
    /// successful append writes it out.
    pub fn append(&mut self, result: ExperimentResult) -> Result<(), StoreError> {
        self.results.push(result);
        self.persist()
    }

    /// Rewrite both snapshot files with the current list
    ///
    /// `latest_results.json` is written first, so a failing archive write
    /// never hides a record from the analyzer.
    pub fn persist(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.results)?;
        write_atomic(&self.latest_path, json.as_bytes())?;
        write_atomic(&self.archive_path, json.as_bytes())?;
        debug!(
            "Persisted {} results to {}",
            self.results.len(),
            self.latest_path.display()
        );
        Ok(())
    }

    pub fn results(&self) -> &[ExperimentResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<ExperimentResult> {
        self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn latest_path(&self) -> &Path {
        &self.latest_path
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Load a snapshot file
    ///
    /// Also removes a stale temp file left by an interrupted write.
    pub fn load(path: &Path) -> Result<Vec<ExperimentResult>, StoreError> {
        let temp_path = temp_path_for(path);
        match std::fs::remove_file(&temp_path) {
            Ok(()) => warn!("Removed stale snapshot temp file {}", temp_path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove stale snapshot temp file {}: {}",
                temp_path.display(),
                e
            ),
        }

        let json = std::fs::read_to_string(path).map_err(io_error(path))?;
        serde_json::from_str(&json).map_err(|e| StoreError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

/// Write `bytes` to `path` via a synced temp file and a rename
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let temp_path = temp_path_for(path);

    let mut file = std::fs::File::create(&temp_path).map_err(io_error(&temp_path))?;
    file.write_all(bytes).map_err(io_error(&temp_path))?;
    file.sync_all().map_err(io_error(&temp_path))?;
    drop(file);

    std::fs::rename(&temp_path, path).map_err(io_error(path))
}
