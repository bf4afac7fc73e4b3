// Payrun Infrastructure - Engine Collaborators
// Implements: PayrunProcessor, NotificationDispatcher

mod notify;
mod processor;

pub use notify::{TracingNotificationDispatcher, WebhookNotificationDispatcher};
pub use processor::EnginePayrunProcessor;
