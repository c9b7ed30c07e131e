use crate::entities::{audit_log_entity, AuditAction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditLogResponse {
    pub id: i64,
    pub user_id: i64,
    pub action: AuditAction,
    pub resource: String,
    pub resource_id: String,
    pub old_values: Option<serde_json::Value>,
    pub new_values: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<audit_log_entity::Model> for AuditLogResponse {
    fn from(entry: audit_log_entity::Model) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            action: entry.action,
            resource: entry.resource,
            resource_id: entry.resource_id,
            old_values: entry.old_values,
            new_values: entry.new_values,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditLogQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
