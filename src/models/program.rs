use crate::entities::loyalty_program_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProgramResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub required_points: i64,
    pub is_active: bool,
    pub max_redemptions: Option<i64>,
    pub current_redemptions: i64,
    pub created_at: DateTime<Utc>,
}

impl From<loyalty_program_entity::Model> for ProgramResponse {
    fn from(program: loyalty_program_entity::Model) -> Self {
        Self {
            id: program.id,
            name: program.name,
            description: program.description,
            required_points: program.required_points,
            is_active: program.is_active,
            max_redemptions: program.max_redemptions,
            current_redemptions: program.current_redemptions,
            created_at: program.created_at,
        }
    }
}

/// Reward card shown to customers: program plus eligibility for this caller.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RewardResponse {
    #[serde(flatten)]
    pub program: ProgramResponse,
    pub can_redeem: bool,
    pub available_points: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateProgramRequest {
    pub name: String,
    pub description: String,
    pub required_points: i64,
    pub max_redemptions: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateProgramRequest {
    pub name: String,
    pub description: String,
    pub required_points: i64,
    pub max_redemptions: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProgramQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
