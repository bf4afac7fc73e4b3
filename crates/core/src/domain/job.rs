// Payrun Job Domain Model

use serde::{Deserialize, Serialize};

/// Job ID (UUID v4)
pub type JobId = String;

/// Tenant identifier
pub type TenantId = String;

/// Payrun identifier
pub type PayrunId = String;

/// User identifier (the user who requested the run)
pub type UserId = String;

/// Payrun job status
///
/// `Process` is transient: the processor may persist it while the
/// computation runs, but the pipeline itself only writes terminal statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Queued,
    Process,
    Complete,
    Abort,
    Error,
}

impl JobStatus {
    /// Terminal statuses never transition again
    pub fn is_final(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Abort | JobStatus::Error)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "QUEUED"),
            JobStatus::Process => write!(f, "PROCESS"),
            JobStatus::Complete => write!(f, "COMPLETE"),
            JobStatus::Abort => write!(f, "ABORT"),
            JobStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Immutable description of what to run
///
/// Created by the producer at enqueue time; read-only to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInvocation {
    pub job_id: JobId,
    pub payrun_id: PayrunId,
    pub user_id: UserId,

    /// Anchor date of the evaluation period (epoch ms)
    pub period_date: i64,
    /// Point-in-time the computation evaluates against, defaults to now
    pub evaluation_date: Option<i64>,
    /// Requester-supplied reason, carried into the job message
    pub reason: Option<String>,
    /// Forecast tag for what-if runs
    pub forecast: Option<String>,
    /// Free-form evaluation parameters
    pub attributes: Option<serde_json::Value>,
}

/// Payrun Job Entity - the durable unit of work state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrunJob {
    pub id: JobId,
    pub tenant_id: TenantId,
    pub payrun_id: PayrunId,

    pub status: JobStatus,

    pub created_at: i64, // epoch ms
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,

    /// Human-readable progress/result message
    pub message: Option<String>,
    /// Failure detail, set by the abort/error paths
    pub error_message: Option<String>,
}

impl PayrunJob {
    /// Create a new job in `Queued` status
    ///
    /// # Arguments
    ///
    /// * `id` - Unique job ID (injected, not generated)
    /// * `tenant_id` - Owning tenant
    /// * `payrun_id` - Payrun definition to execute
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    pub fn new(
        id: impl Into<String>,
        tenant_id: impl Into<String>,
        payrun_id: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            tenant_id: tenant_id.into(),
            payrun_id: payrun_id.into(),
            status: JobStatus::Queued,
            created_at,
            started_at: None,
            finished_at: None,
            message: None,
            error_message: None,
        }
    }

    /// Transition to Process status with explicit timestamp
    pub fn start(&mut self, now_millis: i64) -> crate::domain::error::Result<()> {
        if self.status != JobStatus::Queued {
            return Err(crate::domain::error::DomainError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: "PROCESS".to_string(),
            });
        }
        self.status = JobStatus::Process;
        self.started_at = Some(now_millis);
        Ok(())
    }

    /// Transition to Complete status with explicit timestamp
    pub fn complete(
        &mut self,
        now_millis: i64,
        message: Option<String>,
    ) -> crate::domain::error::Result<()> {
        if self.status.is_final() {
            return Err(crate::domain::error::DomainError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: "COMPLETE".to_string(),
            });
        }
        self.status = JobStatus::Complete;
        self.finished_at = Some(now_millis);
        self.message = message;
        Ok(())
    }

    /// Mark as Abort with explicit timestamp
    ///
    /// Caller is responsible for the terminality check against the stored
    /// record; this method only mutates the in-memory value.
    pub fn abort(&mut self, now_millis: i64, reason: &str) {
        self.status = JobStatus::Abort;
        self.finished_at = Some(now_millis);
        self.message = Some(reason.to_string());
        self.error_message = Some(reason.to_string());
    }

    /// Mark as Error with explicit timestamp
    pub fn fail(&mut self, now_millis: i64, error: &str) {
        self.status = JobStatus::Error;
        self.finished_at = Some(now_millis);
        self.error_message = Some(error.to_string());
    }
}
