//! Snapshot loading
//!
//! Reads a `latest_results.json` style array. Records written by older
//! versions may lack most fields; those default to zero or empty. A record
//! without one of the four required fields, or a file that is not a JSON
//! array, is corruption and fails the load, as does a file that cannot be
//! read at all.

use crate::AnalysisError;
use serde_json::Value;
use std::path::Path;
use tracing::debug;
use veribench_runners::ExperimentResult;

/// Fields every record must carry
pub const REQUIRED_FIELDS: [&str; 4] = ["tool", "benchmark", "success", "execution_time"];

/// Load and validate a snapshot file
pub fn load_snapshot(path: &Path) -> Result<Vec<ExperimentResult>, AnalysisError> {
    let corrupt = |reason| AnalysisError::CorruptSnapshot {
        path: path.to_path_buf(),
        reason,
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| corrupt(format!("cannot read snapshot: {}", e)))?;
    let results = parse_snapshot(&text).map_err(corrupt)?;
    debug!("Loaded {} results from {}", results.len(), path.display());
    Ok(results)
}

/// Parse snapshot text; `Err` carries the reason it is corrupt
pub fn parse_snapshot(text: &str) -> Result<Vec<ExperimentResult>, String> {
    let value: Value = serde_json::from_str(text).map_err(|e| format!("not valid JSON: {}", e))?;
    let Value::Array(records) = value else {
        return Err("expected a JSON array of results".to_string());
    };

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let Some(object) = record.as_object() else {
                return Err(format!("record {} is not an object", index));
            };
            if let Some(missing) = REQUIRED_FIELDS
                .iter()
                .find(|field| object.get(**field).map_or(true, Value::is_null))
            {
                return Err(format!("record {} has no `{}`", index, missing));
            }
            serde_json::from_value(record).map_err(|e| format!("record {}: {}", index, e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use veribench_runners::{ResultStatus, ToolId};

    #[test]
    fn test_parse_minimal_legacy_records() {
        let text = r#"[
            {"tool": "cbmc", "benchmark": "a.c", "success": false, "error": "boom",
             "execution_time": 0, "result": {"status": "ERROR"}},
            {"tool": "framac_value", "benchmark": "b.c", "success": true, "execution_time": 1.5,
             "result": {"status": "COMPLETED", "metrics": {"Analysis time": "1s"}}}
        ]"#;
        let results = parse_snapshot(text).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].tool, ToolId::Cbmc);
        assert_eq!(results[0].return_code, -1);
        assert_eq!(results[0].status(), ResultStatus::Error);
        assert_eq!(results[0].execution_time, 0.0);
        assert_eq!(results[1].metrics.alarms_generated, None);
        assert_eq!(results[1].stdout, "");
    }

    #[test]
    fn test_parse_rejects_missing_required_field() {
        let err = parse_snapshot(r#"[{"tool": "cbmc", "benchmark": "a.c", "success": true}]"#)
            .unwrap_err();
        assert_eq!(err, "record 0 has no `execution_time`");

        let err = parse_snapshot(
            r#"[{"tool": "cbmc", "benchmark": null, "success": true, "execution_time": 1}]"#,
        )
        .unwrap_err();
        assert_eq!(err, "record 0 has no `benchmark`");
    }

    #[test]
    fn test_parse_rejects_non_array_and_unknown_tool() {
        assert!(parse_snapshot("{}").is_err());
        assert!(parse_snapshot("[1]").is_err());
        assert!(parse_snapshot("").is_err());
        let err = parse_snapshot(
            r#"[{"tool": "klee", "benchmark": "a.c", "success": true, "execution_time": 1}]"#,
        )
        .unwrap_err();
        assert!(err.starts_with("record 0:"));
    }

    #[test]
    fn test_load_snapshot_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("latest_results.json");
        match load_snapshot(&missing).unwrap_err() {
            AnalysisError::CorruptSnapshot { reason, .. } => {
                assert!(reason.starts_with("cannot read snapshot"));
            }
            other => panic!("unexpected error: {}", other),
        }

        std::fs::write(&missing, "[{\"tool\": ").unwrap();
        assert!(matches!(
            load_snapshot(&missing).unwrap_err(),
            AnalysisError::CorruptSnapshot { .. }
        ));
    }

    #[test]
    fn test_load_empty_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latest_results.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(load_snapshot(&path).unwrap().is_empty());
    }
}
