//! Benchmark corpus enumeration
//!
//! The corpus is a directory with one sub-folder per defect category. It is
//! produced once, outside this crate, and only read here. Enumeration order
//! is fixed (category order, then file name) so that two runs over the same
//! tree plan the same pairs in the same order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading the corpus tree
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Corpus root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Defect category of a benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MemorySafety,
    Arithmetic,
    Resource,
    Functional,
    Advanced,
    /// Benchmark name matches no known category
    Other,
}

impl Category {
    /// Category folders, in enumeration order
    pub const FOLDERS: [Category; 5] = [
        Category::MemorySafety,
        Category::Arithmetic,
        Category::Resource,
        Category::Functional,
        Category::Advanced,
    ];

    /// Folder name under the corpus root
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::MemorySafety => "memory_safety",
            Category::Arithmetic => "arithmetic",
            Category::Resource => "resource",
            Category::Functional => "functional",
            Category::Advanced => "advanced",
            Category::Other => "other",
        }
    }

    /// Human-readable label used in exports
    pub fn label(&self) -> &'static str {
        match self {
            Category::MemorySafety => "Memory Safety",
            Category::Arithmetic => "Arithmetic Safety",
            Category::Resource => "Resource Usage",
            Category::Functional => "Functional Correctness",
            Category::Advanced => "Advanced Properties",
            Category::Other => "Other",
        }
    }

    /// Categorise a benchmark from its file name alone
    ///
    /// Used where only the identifier is known, e.g. when analysing a
    /// snapshot without the corpus tree.
    pub fn from_benchmark_name(name: &str) -> Category {
        let name = name.to_lowercase();
        if name.contains("buffer") || name.contains("null") {
            Category::MemorySafety
        } else if name.contains("arithmetic") {
            Category::Arithmetic
        } else if name.contains("resource") {
            Category::Resource
        } else if name.contains("functional") {
            Category::Functional
        } else if name.contains("concurrency") || name.contains("cruise") {
            Category::Advanced
        } else {
            Category::Other
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One benchmark source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Benchmark {
    /// Identifier: the file name, e.g. `buffer_overflow.c`
    pub name: String,
    /// Category folder the file was found in
    pub category: Category,
    /// Absolute path to the file
    pub path: PathBuf,
}

/// An enumerated benchmark corpus
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    benchmarks: Vec<Benchmark>,
}

impl Corpus {
    /// Build a corpus from an explicit benchmark list, keeping its order
    pub fn from_benchmarks(benchmarks: Vec<Benchmark>) -> Self {
        Self { benchmarks }
    }

    /// Enumerate `*.c` files under the category folders of `root`
    ///
    /// Missing category folders are skipped.
    pub fn discover(root: &Path) -> Result<Self, CorpusError> {
        if !root.is_dir() {
            return Err(CorpusError::RootNotFound(root.to_path_buf()));
        }
        let root = std::fs::canonicalize(root).map_err(|source| CorpusError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        let mut benchmarks = Vec::new();
        for category in Category::FOLDERS {
            let dir = root.join(category.dir_name());
            if !dir.is_dir() {
                debug!("Skipping missing category folder {}", dir.display());
                continue;
            }
            let entries = std::fs::read_dir(&dir).map_err(|source| CorpusError::Io {
                path: dir.clone(),
                source,
            })?;

            let mut found = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|source| CorpusError::Io {
                    path: dir.clone(),
                    source,
                })?;
                let path = entry.path();
                if path.is_file() && path.extension().is_some_and(|ext| ext == "c") {
                    found.push(Benchmark {
                        name: entry.file_name().to_string_lossy().to_string(),
                        category,
                        path,
                    });
                }
            }
            found.sort_by(|a, b| a.name.cmp(&b.name));
            benchmarks.extend(found);
        }

        debug!("Discovered {} benchmarks under {}", benchmarks.len(), root.display());
        Ok(Self { benchmarks })
    }

    /// Create any missing category folders under `root`
    ///
    /// Returns the folders that were created.
    pub fn ensure_layout(root: &Path) -> Result<Vec<PathBuf>, CorpusError> {
        let mut created = Vec::new();
        for category in Category::FOLDERS {
            let dir = root.join(category.dir_name());
            if !dir.is_dir() {
                std::fs::create_dir_all(&dir).map_err(|source| CorpusError::Io {
                    path: dir.clone(),
                    source,
                })?;
                created.push(dir);
            }
        }
        Ok(created)
    }

    pub fn benchmarks(&self) -> &[Benchmark] {
        &self.benchmarks
    }

    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }

    /// Benchmark counts per category folder, in enumeration order
    pub fn counts_by_category(&self) -> Vec<(Category, usize)> {
        Category::FOLDERS
            .iter()
            .map(|category| {
                let count = self
                    .benchmarks
                    .iter()
                    .filter(|b| b.category == *category)
                    .count();
                (*category, count)
            })
            .collect()
    }
}
