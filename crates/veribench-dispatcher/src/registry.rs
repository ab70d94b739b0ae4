//! Runner registry
//!
//! Maps runner identifiers to the runner instances that serve them. The
//! orchestrator resolves every planned pair through the registry; a
//! missing entry is a per-pair fault, not a batch failure.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use veribench_runners::{
    build_runner, HealthStatus, RunnerConfig, ToolId, VerificationRunner,
};

/// Registered runners keyed by their id
#[derive(Default, Clone)]
pub struct RunnerRegistry {
    runners: HashMap<ToolId, Arc<dyn VerificationRunner>>,
}

impl RunnerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with all four runners built from `config_for(tool)`
    pub fn with_all<F>(mut config_for: F) -> Self
    where
        F: FnMut(ToolId) -> RunnerConfig,
    {
        let mut registry = Self::new();
        for tool in ToolId::ALL {
            registry.register(build_runner(tool, config_for(tool)));
        }
        registry
    }

    /// Register a runner, replacing any runner with the same id
    pub fn register(&mut self, runner: Arc<dyn VerificationRunner>) {
        let id = runner.id();
        info!(tool = %id, "Registering runner");
        self.runners.insert(id, runner);
    }

    pub fn get(&self, id: ToolId) -> Option<Arc<dyn VerificationRunner>> {
        self.runners.get(&id).cloned()
    }

    pub fn contains(&self, id: ToolId) -> bool {
        self.runners.contains_key(&id)
    }

    /// Registered ids in canonical order
    pub fn ids(&self) -> Vec<ToolId> {
        ToolId::ALL
            .into_iter()
            .filter(|id| self.runners.contains_key(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }

    /// Probe every registered runner, in canonical order
    pub async fn check_health(&self) -> Vec<(ToolId, HealthStatus)> {
        let mut statuses = Vec::with_capacity(self.runners.len());
        for id in self.ids() {
            if let Some(runner) = self.runners.get(&id) {
                statuses.push((id, runner.health_check().await));
            }
        }
        statuses
    }
}

impl std::fmt::Debug for RunnerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunnerRegistry")
            .field("runners", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use veribench_runners::{ExperimentResult, RunnerError};

    struct StubRunner {
        id: ToolId,
        health: HealthStatus,
    }

    #[async_trait]
    impl VerificationRunner for StubRunner {
        fn id(&self) -> ToolId {
            self.id
        }

        async fn run_verification(
            &self,
            benchmark: &Path,
            _output_dir: &Path,
        ) -> Result<ExperimentResult, RunnerError> {
            Ok(ExperimentResult::fault(self.id, benchmark.display().to_string(), "stub"))
        }

        async fn health_check(&self) -> HealthStatus {
            self.health.clone()
        }
    }

    fn stub(id: ToolId, health: HealthStatus) -> Arc<dyn VerificationRunner> {
        Arc::new(StubRunner { id, health })
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = RunnerRegistry::new();
        assert!(registry.is_empty());
        registry.register(stub(ToolId::Eacsl, HealthStatus::Healthy));
        registry.register(stub(ToolId::Cbmc, HealthStatus::Healthy));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(ToolId::Cbmc));
        assert!(registry.get(ToolId::FramaCWp).is_none());
        assert_eq!(registry.ids(), vec![ToolId::Cbmc, ToolId::Eacsl]);
    }

    #[test]
    fn test_with_all_registers_every_runner() {
        let registry = RunnerRegistry::with_all(|_| RunnerConfig::default());
        assert_eq!(registry.ids(), ToolId::ALL.to_vec());
        for id in ToolId::ALL {
            assert_eq!(registry.get(id).unwrap().id(), id);
        }
    }

    #[tokio::test]
    async fn test_check_health_in_canonical_order() {
        let mut registry = RunnerRegistry::new();
        registry.register(stub(
            ToolId::FramaCWp,
            HealthStatus::Unavailable {
                reason: "missing".to_string(),
            },
        ));
        registry.register(stub(ToolId::Cbmc, HealthStatus::Healthy));
        let statuses = registry.check_health().await;
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0], (ToolId::Cbmc, HealthStatus::Healthy));
        assert!(!statuses[1].1.is_available());
    }
}
