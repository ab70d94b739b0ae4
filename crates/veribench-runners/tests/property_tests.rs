//! Property-based tests for veribench-runners
//!
//! Uses proptest to verify:
//! - execution_time stays within [0, timeout]
//! - ExperimentResult JSON round-trips, including flattened metrics and
//!   nanosecond-derived execution times
//! - pattern counts never depend on letter case

use proptest::prelude::*;
use std::time::Duration;
use veribench_runners::util::bounded_seconds;
use veribench_runners::{
    ExperimentResult, Metric, PatternTable, ResultStatus, ResultSummary, ToolId, ToolMetrics,
};

fn tool_strategy() -> impl Strategy<Value = ToolId> {
    prop_oneof![
        Just(ToolId::Cbmc),
        Just(ToolId::FramaCValue),
        Just(ToolId::FramaCWp),
        Just(ToolId::Eacsl),
    ]
}

fn status_strategy() -> impl Strategy<Value = ResultStatus> {
    prop_oneof![
        Just(ResultStatus::Safe),
        Just(ResultStatus::Unsafe),
        Just(ResultStatus::Timeout),
        Just(ResultStatus::Error),
        Just(ResultStatus::Completed),
        Just(ResultStatus::Unknown),
    ]
}

fn metrics_strategy() -> impl Strategy<Value = ToolMetrics> {
    (
        prop::collection::vec(prop::option::of(0u64..1000), 7),
        prop::option::of(any::<bool>()),
    )
        .prop_map(|(values, instrumented)| {
            let mut metrics = ToolMetrics::default();
            for (metric, value) in Metric::ALL.iter().zip(values) {
                if let Some(value) = value {
                    metrics.set(*metric, value);
                }
            }
            metrics.instrumentation_success = instrumented;
            metrics
        })
}

prop_compose! {
    fn result_strategy()(
        tool in tool_strategy(),
        benchmark in "[a-z_]{1,20}\\.c",
        success in any::<bool>(),
        nanos in 0u64..=300_000_000_000,
        return_code in -1i32..256,
        stdout in ".{0,40}",
        stderr in ".{0,40}",
        status in status_strategy(),
        metrics in metrics_strategy(),
        error in prop::option::of("[a-z ]{1,20}"),
    ) -> ExperimentResult {
        ExperimentResult {
            tool,
            benchmark,
            success,
            execution_time: Duration::from_nanos(nanos).as_secs_f64(),
            return_code,
            stdout,
            stderr,
            result: ResultSummary::with_status(status),
            metrics,
            error,
        }
    }
}

proptest! {
    #[test]
    fn bounded_seconds_within_bound(elapsed_ms in 0u64..1_000_000, bound_ms in 0u64..1_000_000) {
        let bound = Duration::from_millis(bound_ms);
        let secs = bounded_seconds(Duration::from_millis(elapsed_ms), bound);
        prop_assert!(secs >= 0.0);
        prop_assert!(secs <= bound.as_secs_f64());
    }

    #[test]
    fn timeout_result_time_equals_bound(tool in tool_strategy(), bound_secs in 1u64..1000) {
        let result = ExperimentResult::timeout(tool, "x.c", Duration::from_secs(bound_secs));
        prop_assert_eq!(result.execution_time, bound_secs as f64);
        prop_assert!(!result.success);
        for metric in tool.metrics() {
            prop_assert_eq!(result.metrics.get(*metric), Some(0));
        }
    }

    #[test]
    fn result_json_round_trip(results in prop::collection::vec(result_strategy(), 0..8)) {
        let json = serde_json::to_string_pretty(&results).unwrap();
        let parsed: Vec<ExperimentResult> = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(parsed, results);
    }

    #[test]
    fn pattern_count_ignores_case(text in "[a-zA-Z ]{0,60}") {
        let table = PatternTable::new(&[(Metric::BugsDetected, "overflow")], &[]);
        prop_assert_eq!(
            table.count(Metric::BugsDetected, &text),
            table.count(Metric::BugsDetected, &text.to_uppercase())
        );
    }
}
