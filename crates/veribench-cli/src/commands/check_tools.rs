//! Check tools command implementation
//!
//! Probes every runner's backend and reports which are reachable. Missing
//! tools are reported, never treated as a failure.

use crate::config::Settings;
use veribench_runners::HealthStatus;

pub async fn run_check_tools(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let registry = settings.registry();
    let statuses = registry.check_health().await;
    let total = statuses.len();
    let mut available = 0;

    println!("Verification Tool Status");
    println!("========================\n");
    for (tool, status) in &statuses {
        if status.is_available() {
            available += 1;
        }
        let (symbol, note) = match status {
            HealthStatus::Healthy => ("OK", String::new()),
            HealthStatus::Degraded { reason } => ("WARN", format!(" ({})", reason)),
            HealthStatus::Unavailable { reason } => ("--", format!(" ({})", reason)),
        };
        println!("  [{:>4}] {:<14}{}", symbol, tool.display_name(), note);
    }
    println!("\n{}/{} tools available", available, total);
    Ok(())
}
