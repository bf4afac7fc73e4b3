// Tenant Snapshot

use serde::{Deserialize, Serialize};

use crate::domain::TenantId;

/// Tenant snapshot carried on the queue item
///
/// A copy of the tenant-level settings the computation consults, taken at
/// enqueue time so the running job never reads shared mutable tenant state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub identifier: String,
    pub culture: Option<String>,
    pub calendar: Option<String>,
}

impl Tenant {
    pub fn new(id: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            identifier: identifier.into(),
            culture: None,
            calendar: None,
        }
    }
}
