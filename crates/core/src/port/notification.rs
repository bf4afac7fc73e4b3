// Notification Dispatcher Port (Interface)

use crate::domain::{NotificationEvent, TenantId, UserId};
use crate::error::Result;
use async_trait::async_trait;

/// Best-effort delivery of job progress/completion events
///
/// Failures are local to the caller; the pipeline logs and swallows them.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(
        &self,
        tenant_id: &TenantId,
        event: &NotificationEvent,
        user_id: &UserId,
    ) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::EngineError;
    use std::sync::Mutex;

    /// Recording dispatcher for tests, with optional failure mode
    #[derive(Default)]
    pub struct RecordingDispatcher {
        events: Mutex<Vec<(TenantId, NotificationEvent, UserId)>>,
        fail: Mutex<bool>,
    }

    impl RecordingDispatcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn new_failing() -> Self {
            let dispatcher = Self::default();
            *dispatcher.fail.lock().unwrap() = true;
            dispatcher
        }

        pub fn events(&self) -> Vec<(TenantId, NotificationEvent, UserId)> {
            self.events.lock().unwrap().clone()
        }

        pub fn event_count(&self) -> usize {
            self.events.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl NotificationDispatcher for RecordingDispatcher {
        async fn send(
            &self,
            tenant_id: &TenantId,
            event: &NotificationEvent,
            user_id: &UserId,
        ) -> Result<()> {
            if *self.fail.lock().unwrap() {
                return Err(EngineError::Notification(
                    "dispatcher unavailable".to_string(),
                ));
            }
            self.events
                .lock()
                .unwrap()
                .push((tenant_id.clone(), event.clone(), user_id.clone()));
            Ok(())
        }
    }
}
