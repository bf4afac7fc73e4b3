// Engine Payrun Processor
// Owns the job lifecycle around the computation: Process transition,
// evaluation, Complete finalization. Faults surface to the worker's abort path.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use tracing::info;

use payrun_core::application::ExecutionContext;
use payrun_core::domain::{JobInvocation, PayrunId, PayrunJob, Tenant};
use payrun_core::port::{PayrunProcessor, ProcessorError};

pub struct EnginePayrunProcessor;

impl EnginePayrunProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EnginePayrunProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PayrunProcessor for EnginePayrunProcessor {
    async fn process(
        &self,
        ctx: &ExecutionContext,
        tenant: &Tenant,
        payrun_id: &PayrunId,
        invocation: &JobInvocation,
    ) -> Result<PayrunJob, ProcessorError> {
        let mut job = ctx
            .job_store
            .get(&tenant.id, &invocation.job_id)
            .await
            .map_err(|e| ProcessorError::Store(e.to_string()))?
            .ok_or_else(|| {
                ProcessorError::Store(format!("Job {} not found", invocation.job_id))
            })?;

        job.start(ctx.time_provider.now_millis())
            .map_err(|e| ProcessorError::Computation(e.to_string()))?;
        ctx.job_store
            .update(&tenant.id, &job)
            .await
            .map_err(|e| ProcessorError::Store(e.to_string()))?;

        info!(
            tenant_id = %tenant.id,
            tenant = %tenant.identifier,
            culture = ?tenant.culture,
            job_id = %job.id,
            payrun_id = %payrun_id,
            "Payrun computation started"
        );

        // The evaluation runs under the context's script timeout so a hung
        // script surfaces as a fault instead of wedging the worker.
        let timeout = ctx.settings.script_timeout;
        let period = tokio::time::timeout(timeout, evaluate(invocation))
            .await
            .map_err(|_| ProcessorError::Timeout(timeout.as_millis() as i64))??;

        let message = format!(
            "Payrun {} evaluated for period {} - {}",
            payrun_id, period.start, period.end
        );
        job.complete(ctx.time_provider.now_millis(), Some(message))
            .map_err(|e| ProcessorError::Computation(e.to_string()))?;
        ctx.job_store
            .update(&tenant.id, &job)
            .await
            .map_err(|e| ProcessorError::Store(e.to_string()))?;

        info!(job_id = %job.id, "Payrun computation completed");
        Ok(job)
    }
}

struct EvaluationPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

async fn evaluate(invocation: &JobInvocation) -> Result<EvaluationPeriod, ProcessorError> {
    period_bounds(invocation.period_date)
}

/// Calendar-month period bounds for the invocation's anchor date
fn period_bounds(period_millis: i64) -> Result<EvaluationPeriod, ProcessorError> {
    let date = chrono::DateTime::from_timestamp_millis(period_millis)
        .ok_or_else(|| ProcessorError::Computation(format!("Invalid period date {}", period_millis)))?
        .date_naive();

    let start = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .ok_or_else(|| ProcessorError::Computation(format!("Invalid period start for {}", date)))?;

    let next_month = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    let end = next_month
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| ProcessorError::Computation(format!("Invalid period end for {}", date)))?;

    Ok(EvaluationPeriod { start, end })
}
