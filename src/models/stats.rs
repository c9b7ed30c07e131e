use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Counters for the super-admin dashboard.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SystemStatsResponse {
    pub total_customers: i64,
    pub total_uploads: i64,
    pub pending_uploads: i64,
    pub total_redemptions: i64,
    pub pending_redemptions: i64,
    pub active_programs: i64,
    pub total_points_distributed: i64,
    pub total_points_redeemed: i64,
}
