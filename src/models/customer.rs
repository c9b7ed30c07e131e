use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Dashboard numbers for the customer loyalty page.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoyaltySummaryResponse {
    pub total_points: i64,
    pub available_points: i64,
    /// Lifetime sum of earned transactions (includes refunds).
    pub total_earned: i64,
    /// Absolute lifetime sum of redeemed transactions.
    pub total_redeemed: i64,
    /// Cheapest active reward still above the current balance.
    pub next_reward_points: i64,
    pub next_reward_name: Option<String>,
}
