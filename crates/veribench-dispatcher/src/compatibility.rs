//! Benchmark to runner compatibility table
//!
//! Encodes which verification techniques are meaningful for which defect
//! class. The table is authored, not discovered: a benchmark missing from
//! it is simply not run.

use std::collections::HashMap;
use veribench_runners::ToolId;

/// Ordered runner lists keyed by benchmark identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompatibilityTable {
    entries: HashMap<String, Vec<ToolId>>,
}

impl CompatibilityTable {
    /// An empty table (every benchmark unmapped)
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in table for the standard corpus
    ///
    /// `memory_safety.c` is intentionally absent.
    pub fn standard() -> Self {
        use ToolId::{Cbmc, Eacsl, FramaCValue, FramaCWp};

        Self::from_entries([
            ("buffer_overflow.c", vec![Cbmc, Eacsl]),
            ("null_pointer.c", vec![Cbmc, FramaCValue]),
            ("arithmetic_safety.c", vec![Cbmc, FramaCValue, Eacsl]),
            ("resource_usage.c", vec![FramaCValue]),
            ("functional_correctness.c", vec![FramaCWp, Eacsl]),
            ("concurrency_safety.c", vec![Cbmc, Eacsl]),
            ("cruise_control.c", vec![FramaCWp, Cbmc, FramaCValue]),
        ])
    }

    /// Build a table from `(benchmark, runners)` pairs
    ///
    /// Duplicate runners within one entry keep their first position.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<ToolId>)>,
        S: Into<String>,
    {
        let mut table = Self::default();
        for (benchmark, runners) in entries {
            table.insert(benchmark, runners);
        }
        table
    }

    /// Map `benchmark` to `runners`, replacing any previous entry
    pub fn insert(&mut self, benchmark: impl Into<String>, runners: Vec<ToolId>) {
        let mut ordered: Vec<ToolId> = Vec::with_capacity(runners.len());
        for tool in runners {
            if !ordered.contains(&tool) {
                ordered.push(tool);
            }
        }
        self.entries.insert(benchmark.into(), ordered);
    }

    /// Runners applicable to `benchmark`, in invocation order
    ///
    /// Empty for an unmapped benchmark.
    pub fn applicable_runners(&self, benchmark: &str) -> &[ToolId] {
        self.entries.get(benchmark).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every runner id the table references
    pub fn referenced_tools(&self) -> Vec<ToolId> {
        let mut tools: Vec<ToolId> = self.entries.values().flatten().copied().collect();
        tools.sort();
        tools.dedup();
        tools
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_order() {
        let table = CompatibilityTable::standard();
        assert_eq!(table.len(), 7);
        assert_eq!(
            table.applicable_runners("cruise_control.c"),
            &[ToolId::FramaCWp, ToolId::Cbmc, ToolId::FramaCValue]
        );
        assert_eq!(
            table.applicable_runners("resource_usage.c"),
            &[ToolId::FramaCValue]
        );
    }

    #[test]
    fn test_unmapped_benchmark_is_empty() {
        let table = CompatibilityTable::standard();
        assert!(table.applicable_runners("memory_safety.c").is_empty());
        assert!(table.applicable_runners("").is_empty());
    }

    #[test]
    fn test_insert_dedups_preserving_first_position() {
        let mut table = CompatibilityTable::empty();
        table.insert(
            "x.c",
            vec![ToolId::Eacsl, ToolId::Cbmc, ToolId::Eacsl],
        );
        assert_eq!(table.applicable_runners("x.c"), &[ToolId::Eacsl, ToolId::Cbmc]);
    }

    #[test]
    fn test_referenced_tools() {
        assert_eq!(CompatibilityTable::standard().referenced_tools(), ToolId::ALL.to_vec());
        let table = CompatibilityTable::from_entries([("a.c", vec![ToolId::FramaCWp])]);
        assert_eq!(table.referenced_tools(), vec![ToolId::FramaCWp]);
    }
}
