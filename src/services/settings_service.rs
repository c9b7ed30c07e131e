use crate::entities::{system_setting_entity, AuditAction};
use crate::error::AppResult;
use crate::models::{
    AuthContext, SystemSettingsResponse, UpdateSettingsRequest, ADMIN_ROLES,
};
use crate::services::AuditService;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, TransactionTrait,
};
use serde_json::json;

pub const KEY_POINTS_PER_HOUR: &str = "default_points_per_hour";
pub const KEY_QR_EXPIRY_HOURS: &str = "max_qr_expiry_hours";
pub const KEY_MIN_REDEMPTION_POINTS: &str = "min_redemption_points";

#[derive(Clone)]
pub struct SettingsService {
    db: DatabaseConnection,
    audit: AuditService,
}

impl SettingsService {
    pub fn new(db: DatabaseConnection, audit: AuditService) -> Self {
        Self { db, audit }
    }

    async fn read_key<C: ConnectionTrait>(&self, conn: &C, key: &str, default: i64) -> AppResult<i64> {
        let setting = system_setting_entity::Entity::find()
            .filter(system_setting_entity::Column::Key.eq(key))
            .one(conn)
            .await?;
        Ok(setting
            .and_then(|s| s.value.parse::<i64>().ok())
            .unwrap_or(default))
    }

    /// Points credited per booked hour when the verifying admin does not
    /// supply an override.
    pub async fn points_per_hour<C: ConnectionTrait>(&self, conn: &C) -> AppResult<i64> {
        self.read_key(conn, KEY_POINTS_PER_HOUR, 10).await
    }

    /// Hours a redemption QR code stays valid after the request.
    pub async fn qr_expiry_hours<C: ConnectionTrait>(&self, conn: &C) -> AppResult<i64> {
        self.read_key(conn, KEY_QR_EXPIRY_HOURS, 24).await
    }

    pub async fn get_settings(&self, ctx: &AuthContext) -> AppResult<SystemSettingsResponse> {
        ctx.require(ADMIN_ROLES)?;
        Ok(SystemSettingsResponse {
            default_points_per_hour: self.points_per_hour(&self.db).await?,
            max_qr_expiry_hours: self.qr_expiry_hours(&self.db).await?,
            min_redemption_points: self.read_key(&self.db, KEY_MIN_REDEMPTION_POINTS, 0).await?,
        })
    }

    async fn upsert_key<C: ConnectionTrait>(&self, conn: &C, key: &str, value: i64) -> AppResult<()> {
        let existing = system_setting_entity::Entity::find()
            .filter(system_setting_entity::Column::Key.eq(key))
            .one(conn)
            .await?;
        match existing {
            Some(setting) => {
                let mut active: system_setting_entity::ActiveModel = setting.into();
                active.value = Set(value.to_string());
                active.updated_at = Set(Some(Utc::now()));
                active.update(conn).await?;
            }
            None => {
                system_setting_entity::ActiveModel {
                    key: Set(key.to_string()),
                    value: Set(value.to_string()),
                    description: Set(None),
                    updated_at: Set(Some(Utc::now())),
                    ..Default::default()
                }
                .insert(conn)
                .await?;
            }
        }
        Ok(())
    }

    pub async fn update_settings(
        &self,
        ctx: &AuthContext,
        req: &UpdateSettingsRequest,
    ) -> AppResult<SystemSettingsResponse> {
        ctx.require(ADMIN_ROLES)?;

        if req.default_points_per_hour <= 0 {
            return Err(crate::error::AppError::ValidationError(
                "default_points_per_hour must be positive".to_string(),
            ));
        }
        if req.max_qr_expiry_hours <= 0 {
            return Err(crate::error::AppError::ValidationError(
                "max_qr_expiry_hours must be positive".to_string(),
            ));
        }
        if req.min_redemption_points < 0 {
            return Err(crate::error::AppError::ValidationError(
                "min_redemption_points cannot be negative".to_string(),
            ));
        }

        let old = self.get_settings(ctx).await?;

        let txn = self.db.begin().await?;
        self.upsert_key(&txn, KEY_POINTS_PER_HOUR, req.default_points_per_hour)
            .await?;
        self.upsert_key(&txn, KEY_QR_EXPIRY_HOURS, req.max_qr_expiry_hours)
            .await?;
        self.upsert_key(&txn, KEY_MIN_REDEMPTION_POINTS, req.min_redemption_points)
            .await?;
        self.audit
            .record(
                &txn,
                ctx,
                AuditAction::Update,
                "system_settings",
                "global".to_string(),
                Some(json!({
                    KEY_POINTS_PER_HOUR: old.default_points_per_hour,
                    KEY_QR_EXPIRY_HOURS: old.max_qr_expiry_hours,
                    KEY_MIN_REDEMPTION_POINTS: old.min_redemption_points,
                })),
                Some(json!({
                    KEY_POINTS_PER_HOUR: req.default_points_per_hour,
                    KEY_QR_EXPIRY_HOURS: req.max_qr_expiry_hours,
                    KEY_MIN_REDEMPTION_POINTS: req.min_redemption_points,
                })),
            )
            .await?;
        txn.commit().await?;

        self.get_settings(ctx).await
    }
}
