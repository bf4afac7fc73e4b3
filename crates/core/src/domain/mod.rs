// Domain Layer - Pure business logic and entities

pub mod error;
pub mod job;
pub mod notification;
pub mod queue;
pub mod tenant;

// Re-exports
pub use error::DomainError;
pub use job::{JobId, JobInvocation, JobStatus, PayrunId, PayrunJob, TenantId, UserId};
pub use notification::{NotificationAction, NotificationEvent};
pub use queue::QueueItem;
pub use tenant::Tenant;
