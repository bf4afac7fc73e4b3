// Execution Context - per-job collaborator isolation

use std::sync::Arc;
use std::time::Duration;

use crate::port::{JobStore, TimeProvider};

/// Settings bundle handed to the computation
#[derive(Debug, Clone)]
pub struct ComputationSettings {
    /// Upper bound for a single script evaluation inside the computation
    pub script_timeout: Duration,
    /// Upper bound for auxiliary function-log evaluation
    pub function_log_timeout: Duration,
}

impl Default for ComputationSettings {
    fn default() -> Self {
        Self {
            script_timeout: Duration::from_secs(30),
            function_log_timeout: Duration::from_secs(5),
        }
    }
}

/// Top-level registry of shared collaborators
///
/// Assembled once at composition time; the factory derives per-job contexts
/// from it. No service location happens inside the worker loop body.
pub struct EngineRegistry {
    pub job_store: Arc<dyn JobStore>,
    pub time_provider: Arc<dyn TimeProvider>,
    pub settings: ComputationSettings,
}

/// Isolated set of collaborator handles for one job
///
/// Acquired at the start of job processing and dropped unconditionally on
/// every exit path. Nothing in here is shared mutably across jobs.
pub struct ExecutionContext {
    pub job_store: Arc<dyn JobStore>,
    pub time_provider: Arc<dyn TimeProvider>,
    pub settings: ComputationSettings,
}

/// Produces a fresh `ExecutionContext` per job
#[derive(Clone)]
pub struct ExecutionContextFactory {
    registry: Arc<EngineRegistry>,
}

impl ExecutionContextFactory {
    pub fn new(registry: Arc<EngineRegistry>) -> Self {
        Self { registry }
    }

    pub fn create(&self) -> ExecutionContext {
        ExecutionContext {
            job_store: Arc::clone(&self.registry.job_store),
            time_provider: Arc::clone(&self.registry.time_provider),
            settings: self.registry.settings.clone(),
        }
    }
}
