use crate::entities::{point_transaction_entity, PointTransactionType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PointTransactionResponse {
    pub id: i64,
    pub transaction_type: PointTransactionType,
    pub points: i64,
    pub description: String,
    pub payment_upload_id: Option<i64>,
    pub redemption_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<point_transaction_entity::Model> for PointTransactionResponse {
    fn from(tx: point_transaction_entity::Model) -> Self {
        Self {
            id: tx.id,
            transaction_type: tx.transaction_type,
            points: tx.points,
            description: tx.description,
            payment_upload_id: tx.payment_upload_id,
            redemption_id: tx.redemption_id,
            created_at: tx.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PointHistoryQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
