// Port Layer - Interfaces for external collaborators

pub mod id_provider;
pub mod job_store;
pub mod notification;
pub mod payrun_processor;
pub mod time_provider;

// Re-exports
pub use id_provider::IdProvider;
pub use job_store::JobStore;
pub use notification::NotificationDispatcher;
pub use payrun_processor::{PayrunProcessor, ProcessorError};
pub use time_provider::TimeProvider;
