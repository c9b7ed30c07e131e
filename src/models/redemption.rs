use crate::entities::{redemption_entity, RedemptionStatus};
use crate::models::VerifyDecision;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RedeemRequest {
    pub program_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RedemptionResponse {
    pub id: i64,
    pub customer_id: i64,
    pub program_id: i64,
    pub status: RedemptionStatus,
    pub points_used: i64,
    pub qr_code: String,
    pub qr_code_expiry: Option<DateTime<Utc>>,
    pub approved_by: Option<i64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub used_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Populated on admin listings and QR scans.
    pub customer_name: Option<String>,
    pub program_name: Option<String>,
}

impl RedemptionResponse {
    pub fn from_model(
        redemption: redemption_entity::Model,
        customer_name: Option<String>,
        program_name: Option<String>,
    ) -> Self {
        Self {
            id: redemption.id,
            customer_id: redemption.customer_id,
            program_id: redemption.program_id,
            status: redemption.status,
            points_used: redemption.points_used,
            qr_code: redemption.qr_code,
            qr_code_expiry: redemption.qr_code_expiry,
            approved_by: redemption.approved_by,
            approved_at: redemption.approved_at,
            used_at: redemption.used_at,
            admin_notes: redemption.admin_notes,
            created_at: redemption.created_at,
            customer_name,
            program_name,
        }
    }
}

impl From<redemption_entity::Model> for RedemptionResponse {
    fn from(redemption: redemption_entity::Model) -> Self {
        Self::from_model(redemption, None, None)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyRedemptionRequest {
    pub decision: VerifyDecision,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RedemptionQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
