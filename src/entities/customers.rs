use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Point ledger owner. `user_id` is the identity-provider subject; the row is
/// provisioned lazily on the first customer-scoped request.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub display_name: String,
    pub total_points: i64,
    pub available_points: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
