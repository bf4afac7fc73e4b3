// SQLite JobStore Implementation

use async_trait::async_trait;
use sqlx::SqlitePool;

use payrun_core::domain::{JobId, JobStatus, PayrunJob, TenantId};
use payrun_core::error::{EngineError, Result};
use payrun_core::port::JobStore;

// Helper to convert sqlx::Error to EngineError with structured information
fn map_sqlx_error(err: sqlx::Error) -> EngineError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "2067" | "1555" => EngineError::Store(format!(
                        "Unique constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "5" => EngineError::Store(format!(
                        "Database locked (SQLITE_BUSY): {}",
                        db_err.message()
                    )),
                    "13" => EngineError::Store(format!("Database full: {}", db_err.message())),
                    _ => EngineError::Store(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                EngineError::Store(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => EngineError::Store("Row not found".to_string()),
        _ => EngineError::Store(err.to_string()),
    }
}

pub struct SqliteJobStore {
    pool: SqlitePool,
}

impl SqliteJobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn insert(&self, tenant_id: &TenantId, job: &PayrunJob) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payrun_jobs (
                id, tenant_id, payrun_id, status,
                created_at, started_at, finished_at,
                message, error_message
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(tenant_id)
        .bind(&job.payrun_id)
        .bind(job.status.to_string())
        .bind(job.created_at)
        .bind(job.started_at)
        .bind(job.finished_at)
        .bind(&job.message)
        .bind(&job.error_message)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn get(&self, tenant_id: &TenantId, job_id: &JobId) -> Result<Option<PayrunJob>> {
        let row = sqlx::query_as::<_, JobRow>(
            "SELECT * FROM payrun_jobs WHERE id = ? AND tenant_id = ?",
        )
        .bind(job_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(|r| r.into_job()))
    }

    async fn update(&self, tenant_id: &TenantId, job: &PayrunJob) -> Result<()> {
        // Conditional update: a stored terminal status is never overwritten,
        // even by a racing writer that read a stale record.
        let result = sqlx::query(
            r#"
            UPDATE payrun_jobs
            SET status = ?, started_at = ?, finished_at = ?, message = ?, error_message = ?
            WHERE id = ? AND tenant_id = ?
              AND status NOT IN ('COMPLETE', 'ABORT', 'ERROR')
            "#,
        )
        .bind(job.status.to_string())
        .bind(job.started_at)
        .bind(job.finished_at)
        .bind(&job.message)
        .bind(&job.error_message)
        .bind(&job.id)
        .bind(tenant_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            // Distinguish "not found" from "already final"
            let current: Option<String> = sqlx::query_scalar(
                "SELECT status FROM payrun_jobs WHERE id = ? AND tenant_id = ?",
            )
            .bind(&job.id)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

            return match current {
                None => Err(EngineError::NotFound(format!("Job {} not found", job.id))),
                Some(status) => Err(EngineError::Store(format!(
                    "Cannot update job {}: stored status {} is final",
                    job.id, status
                ))),
            };
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct JobRow {
    id: String,
    tenant_id: String,
    payrun_id: String,
    status: String,
    created_at: i64,
    started_at: Option<i64>,
    finished_at: Option<i64>,
    message: Option<String>,
    error_message: Option<String>,
}

impl JobRow {
    fn into_job(self) -> PayrunJob {
        let status = match self.status.as_str() {
            "QUEUED" => JobStatus::Queued,
            "PROCESS" => JobStatus::Process,
            "COMPLETE" => JobStatus::Complete,
            "ABORT" => JobStatus::Abort,
            _ => JobStatus::Error, // Default fallback
        };

        PayrunJob {
            id: self.id,
            tenant_id: self.tenant_id,
            payrun_id: self.payrun_id,
            status,
            created_at: self.created_at,
            started_at: self.started_at,
            finished_at: self.finished_at,
            message: self.message,
            error_message: self.error_message,
        }
    }
}
