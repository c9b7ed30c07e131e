use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Named attendee of a booking. `customer_id` is a best-effort match against
/// registered customers at submission time and stays NULL when unmatched.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "booking_participants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub payment_upload_id: i64,
    pub customer_name: String,
    pub customer_id: Option<i64>,
    pub points_allocated: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
