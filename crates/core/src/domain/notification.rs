// Notification Event - best-effort job progress/completion fan-out

use serde::{Deserialize, Serialize};

use crate::domain::{JobStatus, PayrunJob, UserId};

/// Notification action tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationAction {
    JobProcess,
    JobFinish,
}

impl NotificationAction {
    /// `JobFinish` only for a successfully completed job; every other
    /// terminal disposition reports as `JobProcess`
    pub fn for_status(status: JobStatus) -> Self {
        match status {
            JobStatus::Complete => NotificationAction::JobFinish,
            _ => NotificationAction::JobProcess,
        }
    }
}

impl std::fmt::Display for NotificationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationAction::JobProcess => write!(f, "JOB_PROCESS"),
            NotificationAction::JobFinish => write!(f, "JOB_FINISH"),
        }
    }
}

/// Event describing a job that reached a terminal status
///
/// Owned by the worker for the duration of dispatch; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub action: NotificationAction,
    /// Serialized snapshot of the job at dispatch time
    pub job: serde_json::Value,
    pub user_id: UserId,
}

impl NotificationEvent {
    pub fn from_job(job: &PayrunJob, user_id: impl Into<String>) -> serde_json::Result<Self> {
        Ok(Self {
            action: NotificationAction::for_status(job.status),
            job: serde_json::to_value(job)?,
            user_id: user_id.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_by_status() {
        assert_eq!(
            NotificationAction::for_status(JobStatus::Complete),
            NotificationAction::JobFinish
        );
        assert_eq!(
            NotificationAction::for_status(JobStatus::Abort),
            NotificationAction::JobProcess
        );
        assert_eq!(
            NotificationAction::for_status(JobStatus::Error),
            NotificationAction::JobProcess
        );
    }

    #[test]
    fn test_event_snapshots_job() {
        let mut job = PayrunJob::new("job-9", "tenant-1", "payrun-1", 1000);
        job.abort(2000, "boom");

        let event = NotificationEvent::from_job(&job, "user-7").unwrap();
        assert_eq!(event.action, NotificationAction::JobProcess);
        assert_eq!(event.user_id, "user-7");
        assert_eq!(event.job["status"], "ABORT");
        assert_eq!(event.job["error_message"], "boom");
    }
}
