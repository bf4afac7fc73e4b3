// Job Store Port (Interface)

use crate::domain::{JobId, PayrunJob, TenantId};
use crate::error::Result;
use async_trait::async_trait;

/// Durable record of job status
///
/// Access is always scoped to a single (tenant id, job id) key; the store is
/// expected to provide atomic read-modify-write semantics per job record.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new job record
    async fn insert(&self, tenant_id: &TenantId, job: &PayrunJob) -> Result<()>;

    /// Read a job by (tenant id, job id)
    async fn get(&self, tenant_id: &TenantId, job_id: &JobId) -> Result<Option<PayrunJob>>;

    /// Write a status transition back
    async fn update(&self, tenant_id: &TenantId, job: &PayrunJob) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::EngineError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory job store for tests
    ///
    /// Counts writes and can be switched into failure mode to exercise the
    /// store-fault paths.
    #[derive(Default)]
    pub struct InMemoryJobStore {
        jobs: Mutex<HashMap<(TenantId, JobId), PayrunJob>>,
        update_count: Mutex<usize>,
        fail_reads: Mutex<bool>,
        fail_writes: Mutex<bool>,
    }

    impl InMemoryJobStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn update_count(&self) -> usize {
            *self.update_count.lock().unwrap()
        }

        pub fn set_fail_reads(&self, fail: bool) {
            *self.fail_reads.lock().unwrap() = fail;
        }

        pub fn set_fail_writes(&self, fail: bool) {
            *self.fail_writes.lock().unwrap() = fail;
        }
    }

    #[async_trait]
    impl JobStore for InMemoryJobStore {
        async fn insert(&self, tenant_id: &TenantId, job: &PayrunJob) -> Result<()> {
            if *self.fail_writes.lock().unwrap() {
                return Err(EngineError::Store("store unreachable".to_string()));
            }
            self.jobs
                .lock()
                .unwrap()
                .insert((tenant_id.clone(), job.id.clone()), job.clone());
            Ok(())
        }

        async fn get(&self, tenant_id: &TenantId, job_id: &JobId) -> Result<Option<PayrunJob>> {
            if *self.fail_reads.lock().unwrap() {
                return Err(EngineError::Store("store unreachable".to_string()));
            }
            Ok(self
                .jobs
                .lock()
                .unwrap()
                .get(&(tenant_id.clone(), job_id.clone()))
                .cloned())
        }

        async fn update(&self, tenant_id: &TenantId, job: &PayrunJob) -> Result<()> {
            if *self.fail_writes.lock().unwrap() {
                return Err(EngineError::Store("store unreachable".to_string()));
            }
            let mut jobs = self.jobs.lock().unwrap();
            let key = (tenant_id.clone(), job.id.clone());
            if !jobs.contains_key(&key) {
                return Err(EngineError::NotFound(format!("Job {} not found", job.id)));
            }
            jobs.insert(key, job.clone());
            *self.update_count.lock().unwrap() += 1;
            Ok(())
        }
    }
}
