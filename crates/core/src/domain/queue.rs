// Queue Item - the envelope handed from producer to worker

use serde::{Deserialize, Serialize};

use crate::domain::{JobId, JobInvocation, PayrunId, Tenant, TenantId};

/// Envelope placed on the job queue
///
/// Exactly one queue item exists per requested execution. The job record is
/// created (status `Queued`) before the item is enqueued, so `job_id` always
/// refers to a persisted job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItem {
    pub tenant_id: TenantId,
    pub tenant: Tenant,
    pub payrun_id: PayrunId,
    pub job_id: JobId,
    pub invocation: JobInvocation,
}

impl QueueItem {
    pub fn new(tenant: Tenant, invocation: JobInvocation) -> Self {
        Self {
            tenant_id: tenant.id.clone(),
            payrun_id: invocation.payrun_id.clone(),
            job_id: invocation.job_id.clone(),
            tenant,
            invocation,
        }
    }
}
