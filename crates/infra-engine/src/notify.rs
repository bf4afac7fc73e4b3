// Notification Dispatchers
// Webhook delivery of job events, with a tracing-only fallback

use async_trait::async_trait;
use tracing::info;

use payrun_core::domain::{NotificationEvent, TenantId, UserId};
use payrun_core::error::{EngineError, Result};
use payrun_core::port::NotificationDispatcher;

/// POSTs the event JSON to a configured endpoint
pub struct WebhookNotificationDispatcher {
    client: reqwest::Client,
    endpoint: String,
}

impl WebhookNotificationDispatcher {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    fn payload(
        tenant_id: &TenantId,
        event: &NotificationEvent,
        user_id: &UserId,
    ) -> serde_json::Value {
        serde_json::json!({
            "action": event.action,
            "tenantId": tenant_id,
            "userId": user_id,
            "payrunJob": event.job,
        })
    }
}

#[async_trait]
impl NotificationDispatcher for WebhookNotificationDispatcher {
    async fn send(
        &self,
        tenant_id: &TenantId,
        event: &NotificationEvent,
        user_id: &UserId,
    ) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&Self::payload(tenant_id, event, user_id))
            .send()
            .await
            .map_err(|e| EngineError::Notification(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::Notification(format!(
                "Webhook returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Logs the event instead of delivering it
///
/// Used when no webhook endpoint is configured.
pub struct TracingNotificationDispatcher;

#[async_trait]
impl NotificationDispatcher for TracingNotificationDispatcher {
    async fn send(
        &self,
        tenant_id: &TenantId,
        event: &NotificationEvent,
        user_id: &UserId,
    ) -> Result<()> {
        info!(
            tenant_id = %tenant_id,
            action = %event.action,
            user_id = %user_id,
            "Payrun job notification"
        );
        Ok(())
    }
}
