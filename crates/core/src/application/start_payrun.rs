// Start Payrun Use Case - the producer side of the pipeline

use serde::{Deserialize, Serialize};

use crate::application::queue::JobQueue;
use crate::domain::{JobId, JobInvocation, PayrunJob, QueueItem, Tenant};
use crate::error::{EngineError, Result};
use crate::port::{IdProvider, JobStore, TimeProvider};

/// Request to start a payrun computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartPayrunRequest {
    pub tenant: Tenant,
    pub payrun_id: String,
    pub user_id: String,

    /// Anchor date of the evaluation period (epoch ms)
    pub period_date: i64,

    #[serde(default)]
    pub evaluation_date: Option<i64>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub forecast: Option<String>,
    #[serde(default)]
    pub attributes: Option<serde_json::Value>,
}

/// Execute the start-payrun use case
///
/// Creates the durable `Queued` job record first, then places the queue item;
/// the caller is decoupled from the outcome (observed later via the Job Store
/// or the notification channel).
pub async fn execute(
    queue: &JobQueue,
    job_store: &dyn JobStore,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: StartPayrunRequest,
) -> Result<JobId> {
    validate_request(&req)?;

    let job_id = id_provider.generate_id();
    let created_at = time_provider.now_millis();

    let job = PayrunJob::new(job_id.clone(), req.tenant.id.clone(), req.payrun_id.clone(), created_at);
    job_store.insert(&req.tenant.id, &job).await?;

    let invocation = JobInvocation {
        job_id: job_id.clone(),
        payrun_id: req.payrun_id,
        user_id: req.user_id,
        period_date: req.period_date,
        evaluation_date: req.evaluation_date,
        reason: req.reason,
        forecast: req.forecast,
        attributes: req.attributes,
    };

    queue.enqueue(QueueItem::new(req.tenant, invocation));

    Ok(job_id)
}

fn validate_request(req: &StartPayrunRequest) -> Result<()> {
    if req.tenant.id.is_empty() {
        return Err(EngineError::Validation("tenant id is empty".to_string()));
    }
    if req.payrun_id.is_empty() {
        return Err(EngineError::Validation("payrun id is empty".to_string()));
    }
    if req.user_id.is_empty() {
        return Err(EngineError::Validation("user id is empty".to_string()));
    }
    Ok(())
}
