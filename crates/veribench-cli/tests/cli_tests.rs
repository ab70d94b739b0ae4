//! Integration tests for the veribench binary

use serial_test::serial;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Command running in `dir` with no inherited veribench environment
fn veribench(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_veribench"));
    cmd.current_dir(dir)
        .env_remove("VERIBENCH_CONFIG")
        .env_remove("VERIBENCH_CORPUS_DIR")
        .env_remove("VERIBENCH_RESULTS_DIR")
        .env_remove("RUST_LOG");
    cmd
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("Failed to execute veribench")
}

fn assert_success(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{} failed: {}",
        what,
        String::from_utf8_lossy(&output.stderr)
    );
}

const SNAPSHOT: &str = r#"[
  {"tool": "cbmc", "benchmark": "buffer_overflow.c", "success": true, "execution_time": 2.0,
   "return_code": 10, "result": {"status": "UNSAFE"}, "bugs_detected": 1, "properties_verified": 0},
  {"tool": "eacsl", "benchmark": "buffer_overflow.c", "success": false, "execution_time": 300.0,
   "return_code": -1, "result": {"status": "TIMEOUT"}, "runtime_checks_inserted": 0}
]"#;

// ============================================================================
// setup
// ============================================================================

#[test]
#[serial]
fn test_setup_creates_layout() {
    let dir = TempDir::new().unwrap();
    let output = run(veribench(dir.path()).arg("setup"));
    assert_success(&output, "setup");

    for sub in ["results/raw", "results/processed", "benchmarks/memory_safety", "benchmarks/advanced"] {
        assert!(dir.path().join(sub).is_dir(), "{} missing", sub);
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0 benchmarks"), "unexpected output: {}", stdout);
}

#[test]
#[serial]
fn test_directory_flags_override_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("veribench.toml"),
        "corpus_dir = \"from_file\"\nresults_dir = \"out\"\n",
    )
    .unwrap();

    let output = run(veribench(dir.path()).args(["--corpus-dir", "from_flag", "setup"]));
    assert_success(&output, "setup");
    assert!(dir.path().join("from_flag/arithmetic").is_dir());
    assert!(!dir.path().join("from_file").exists());
    assert!(dir.path().join("out/raw").is_dir());
}

#[test]
#[serial]
fn test_missing_explicit_config_fails() {
    let dir = TempDir::new().unwrap();
    let output = run(veribench(dir.path()).args(["--config", "nope.toml", "setup"]));
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope.toml"));
}

#[test]
#[serial]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("veribench.toml"), "[tools.klee]\n").unwrap();
    let output = run(veribench(dir.path()).arg("setup"));
    assert!(!output.status.success());
}

// ============================================================================
// analyze
// ============================================================================

#[test]
#[serial]
fn test_analyze_latest_snapshot() {
    let dir = TempDir::new().unwrap();
    let raw = dir.path().join("results/raw");
    std::fs::create_dir_all(&raw).unwrap();
    std::fs::write(raw.join("latest_results.json"), SNAPSHOT).unwrap();

    let output = run(veribench(dir.path()).arg("analyze"));
    assert_success(&output, "analyze");

    let processed = dir.path().join("results/processed");
    for file in [
        "comprehensive_analysis.json",
        "experiment_results.csv",
        "performance_comparison.csv",
    ] {
        assert!(processed.join(file).is_file(), "{} missing", file);
    }
    let analysis: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(processed.join("comprehensive_analysis.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(analysis["tool_recommendations"]["fastest_tool"], "cbmc");
    assert_eq!(analysis["performance_comparison"]["eacsl"]["timeout_count"], 1);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Fastest tool:"), "unexpected output: {}", stdout);
    assert!(stdout.contains("CBMC"));
}

#[test]
#[serial]
fn test_analyze_explicit_snapshot() {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("archived.json");
    std::fs::write(&snapshot, SNAPSHOT).unwrap();

    let output = run(veribench(dir.path()).args(["analyze", "--snapshot"]).arg(&snapshot));
    assert_success(&output, "analyze --snapshot");
    assert!(dir.path().join("results/processed/experiment_results.csv").is_file());
}

#[test]
#[serial]
fn test_analyze_corrupt_snapshot_fails() {
    let dir = TempDir::new().unwrap();
    let raw = dir.path().join("results/raw");
    std::fs::create_dir_all(&raw).unwrap();
    std::fs::write(raw.join("latest_results.json"), "{\"not\": \"an array\"}").unwrap();

    let output = run(veribench(dir.path()).arg("analyze"));
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Corrupt snapshot"));
    assert!(!dir.path().join("results/processed/comprehensive_analysis.json").exists());
}

// ============================================================================
// run / all / check-tools
// ============================================================================

fn missing_tools_config(dir: &Path) {
    let mut text = String::new();
    for tool in ["cbmc", "framac_value", "framac_wp", "eacsl"] {
        text.push_str(&format!(
            "[tools.{}]\nprogram = \"{}\"\n",
            tool,
            dir.join("no-such-tool").display()
        ));
    }
    std::fs::write(dir.join("veribench.toml"), text).unwrap();
}

#[test]
#[serial]
fn test_check_tools_never_fails() {
    let dir = TempDir::new().unwrap();
    missing_tools_config(dir.path());
    let output = run(veribench(dir.path()).arg("check-tools"));
    assert_success(&output, "check-tools");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0/4 tools available"), "unexpected output: {}", stdout);
}

#[test]
#[serial]
fn test_run_empty_corpus_writes_empty_snapshot() {
    let dir = TempDir::new().unwrap();
    assert_success(&run(veribench(dir.path()).arg("setup")), "setup");

    let output = run(veribench(dir.path()).arg("run"));
    assert_success(&output, "run");
    let latest = std::fs::read_to_string(dir.path().join("results/raw/latest_results.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&latest).unwrap();
    assert_eq!(parsed, serde_json::json!([]));
    assert!(String::from_utf8_lossy(&output.stdout).contains("0/0 pairs completed"));
}

#[test]
#[serial]
fn test_run_clamps_huge_max_concurrent() {
    let dir = TempDir::new().unwrap();
    assert_success(&run(veribench(dir.path()).arg("setup")), "setup");

    let huge = usize::MAX.to_string();
    let output = run(veribench(dir.path()).args(["run", "--max-concurrent", huge.as_str()]));
    assert_success(&output, "run --max-concurrent");
    assert!(String::from_utf8_lossy(&output.stdout).contains("0/0 pairs completed"));
}

#[test]
#[serial]
fn test_run_without_corpus_fails() {
    let dir = TempDir::new().unwrap();
    let output = run(veribench(dir.path()).arg("run"));
    assert!(!output.status.success());
}

#[test]
#[serial]
fn test_all_with_missing_tools_completes() {
    let dir = TempDir::new().unwrap();
    missing_tools_config(dir.path());
    let memory = dir.path().join("benchmarks/memory_safety");
    std::fs::create_dir_all(&memory).unwrap();
    std::fs::write(memory.join("buffer_overflow.c"), "int main(void) { return 0; }\n").unwrap();

    let output = run(veribench(dir.path()).args(["all", "--timeout", "5"]));
    assert_success(&output, "all");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2/2 pairs completed"), "unexpected output: {}", stdout);
    assert!(stdout.contains("2 errored"), "unexpected output: {}", stdout);

    let analysis: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("results/processed/comprehensive_analysis.json"))
            .unwrap(),
    )
    .unwrap();
    assert_eq!(analysis["summary"]["total_experiments"], 2);
    assert_eq!(analysis["summary"]["successful_runs"], 0);
}

#[cfg(unix)]
#[test]
#[serial]
fn test_run_with_scripted_backend() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let script = dir.path().join("fake-cbmc");
    std::fs::write(&script, "#!/bin/sh\necho 'VERIFICATION SUCCESSFUL'\nexit 0\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    std::fs::write(
        dir.path().join("veribench.toml"),
        format!(
            "[tools.cbmc]\nprogram = \"{}\"\n\n[compatibility]\n\"simple.c\" = [\"cbmc\"]\n",
            script.display()
        ),
    )
    .unwrap();
    let functional = dir.path().join("benchmarks/functional");
    std::fs::create_dir_all(&functional).unwrap();
    std::fs::write(functional.join("simple.c"), "int main(void) { return 0; }\n").unwrap();

    let output = run(veribench(dir.path()).arg("run"));
    assert_success(&output, "run");

    let latest: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("results/raw/latest_results.json")).unwrap(),
    )
    .unwrap();
    let records = latest.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["tool"], "cbmc");
    assert_eq!(records[0]["benchmark"], "simple.c");
    assert_eq!(records[0]["success"], true);
    assert_eq!(records[0]["result"]["status"], "SAFE");
}
