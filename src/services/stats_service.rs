use crate::entities::{
    customer_entity, loyalty_program_entity, payment_upload_entity, point_transaction_entity,
    redemption_entity, PointTransactionType, RedemptionStatus, UploadStatus,
};
use crate::error::AppResult;
use crate::models::{AuthContext, SystemStatsResponse, SUPER_ADMIN_ONLY};
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};

#[derive(Clone)]
pub struct StatsService {
    db: DatabaseConnection,
}

impl StatsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn sum_by_type(&self, transaction_type: PointTransactionType) -> AppResult<i64> {
        let total: Option<Option<i64>> = point_transaction_entity::Entity::find()
            .select_only()
            .column_as(
                Expr::col(point_transaction_entity::Column::Points)
                    .sum()
                    .cast_as(Alias::new("BIGINT")),
                "total",
            )
            .filter(point_transaction_entity::Column::TransactionType.eq(transaction_type))
            .into_tuple()
            .one(&self.db)
            .await?;
        Ok(total.flatten().unwrap_or(0))
    }

    pub async fn system_stats(&self, ctx: &AuthContext) -> AppResult<SystemStatsResponse> {
        ctx.require(SUPER_ADMIN_ONLY)?;

        let total_customers = customer_entity::Entity::find().count(&self.db).await? as i64;
        let total_uploads = payment_upload_entity::Entity::find().count(&self.db).await? as i64;
        let pending_uploads = payment_upload_entity::Entity::find()
            .filter(payment_upload_entity::Column::Status.eq(UploadStatus::Pending))
            .count(&self.db)
            .await? as i64;
        let total_redemptions = redemption_entity::Entity::find().count(&self.db).await? as i64;
        let pending_redemptions = redemption_entity::Entity::find()
            .filter(redemption_entity::Column::Status.eq(RedemptionStatus::Pending))
            .count(&self.db)
            .await? as i64;
        let active_programs = loyalty_program_entity::Entity::find()
            .filter(loyalty_program_entity::Column::IsActive.eq(true))
            .count(&self.db)
            .await? as i64;

        Ok(SystemStatsResponse {
            total_customers,
            total_uploads,
            pending_uploads,
            total_redemptions,
            pending_redemptions,
            active_programs,
            total_points_distributed: self.sum_by_type(PointTransactionType::Earned).await?,
            total_points_redeemed: self.sum_by_type(PointTransactionType::Redeemed).await?.abs(),
        })
    }
}
