use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SystemSettingsResponse {
    pub default_points_per_hour: i64,
    pub max_qr_expiry_hours: i64,
    pub min_redemption_points: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    pub default_points_per_hour: i64,
    pub max_qr_expiry_hours: i64,
    pub min_redemption_points: i64,
}
