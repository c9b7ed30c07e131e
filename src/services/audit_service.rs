use crate::entities::{audit_log_entity, AuditAction};
use crate::error::AppResult;
use crate::models::{
    AuditLogResponse, AuthContext, PaginatedResponse, PaginationParams, SUPER_ADMIN_ONLY,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryOrder, QuerySelect,
};

#[derive(Clone)]
pub struct AuditService {
    db: DatabaseConnection,
}

impl AuditService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends an audit entry inside the caller's transaction so the entry
    /// commits or rolls back together with the change it describes.
    pub async fn record<C: ConnectionTrait>(
        &self,
        conn: &C,
        ctx: &AuthContext,
        action: AuditAction,
        resource: &str,
        resource_id: String,
        old_values: Option<serde_json::Value>,
        new_values: Option<serde_json::Value>,
    ) -> AppResult<()> {
        audit_log_entity::ActiveModel {
            user_id: Set(ctx.user_id),
            action: Set(action),
            resource: Set(resource.to_string()),
            resource_id: Set(resource_id),
            old_values: Set(old_values),
            new_values: Set(new_values),
            ip_address: Set(ctx.ip_address.clone()),
            user_agent: Set(ctx.user_agent.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        Ok(())
    }

    pub async fn list(
        &self,
        ctx: &AuthContext,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<AuditLogResponse>> {
        ctx.require(SUPER_ADMIN_ONLY)?;

        let total = audit_log_entity::Entity::find().count(&self.db).await? as i64;
        let entries = audit_log_entity::Entity::find()
            .order_by_desc(audit_log_entity::Column::CreatedAt)
            .order_by_desc(audit_log_entity::Column::Id)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.db)
            .await?;

        Ok(PaginatedResponse::new(
            entries.into_iter().map(Into::into).collect(),
            params.page.unwrap_or(1).max(1),
            params.get_limit(),
            total,
        ))
    }
}
