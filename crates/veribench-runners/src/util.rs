//! Utility functions shared across runners

use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Kani Formal Verification Proofs
// ============================================================================

#[cfg(kani)]
mod kani_proofs {
    use super::*;

    /// Verify bounded_seconds never exceeds the bound
    #[kani::proof]
    fn proof_bounded_seconds_within_bound() {
        let elapsed_ms: u32 = kani::any();
        let bound_ms: u32 = kani::any();
        let secs = bounded_seconds(
            Duration::from_millis(u64::from(elapsed_ms)),
            Duration::from_millis(u64::from(bound_ms)),
        );
        kani::assert(secs >= 0.0, "seconds should be non-negative");
        kani::assert(
            secs <= Duration::from_millis(u64::from(bound_ms)).as_secs_f64(),
            "seconds should not exceed the bound",
        );
    }

    /// Verify that expand_home_dir returns absolute paths as-is
    #[kani::proof]
    fn proof_expand_home_dir_absolute_path() {
        let input = "/usr/bin/cbmc";
        let result = expand_home_dir(input);
        kani::assert(result.is_some(), "Absolute paths should return Some");
    }
}

/// Expands `~` to the user's home directory in paths.
///
/// # Examples
///
/// ```
/// use veribench_runners::util::expand_home_dir;
/// use std::path::PathBuf;
///
/// // Paths starting with ~/ are expanded
/// if let Some(path) = expand_home_dir("~/tools/frama-c/bin/frama-c") {
///     assert!(path.to_string_lossy().contains("bin/frama-c"));
/// }
///
/// // Absolute paths are returned as-is
/// let path = expand_home_dir("/usr/bin/cbmc");
/// assert_eq!(path, Some(PathBuf::from("/usr/bin/cbmc")));
/// ```
#[must_use]
pub fn expand_home_dir(path: &str) -> Option<PathBuf> {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir().map(|home| home.join(rest))
    } else {
        Some(PathBuf::from(path))
    }
}

/// Elapsed wall-clock seconds, clamped to `[0, bound]`
#[must_use]
pub fn bounded_seconds(elapsed: Duration, bound: Duration) -> f64 {
    elapsed.min(bound).as_secs_f64()
}

/// Trimmed lines of `text` containing any of `needles` (case-insensitive)
#[must_use]
pub fn lines_mentioning(text: &str, needles: &[&str]) -> Vec<String> {
    text.lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            needles.iter().any(|needle| lower.contains(needle))
        })
        .map(|line| line.trim().to_string())
        .collect()
}
