use crate::entities::{
    customer_entity, loyalty_program_entity, point_transaction_entity, PointTransactionType,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthContext, LoyaltySummaryResponse, PaginatedResponse, PaginationParams,
    PointTransactionResponse, CUSTOMER_ONLY,
};
use chrono::Utc;
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

/// Owns the point balances and the append-only transaction ledger. Every
/// balance change goes through `credit`, `refund` or `debit`, each of which
/// writes a matching ledger row on the same connection.
#[derive(Clone)]
pub struct LedgerService {
    db: DatabaseConnection,
}

impl LedgerService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Looks up the caller's customer row, provisioning it on first contact.
    /// Keeps the stored display name in sync with the token claim since
    /// participant matching depends on it.
    pub async fn find_or_create<C: ConnectionTrait>(
        &self,
        conn: &C,
        ctx: &AuthContext,
    ) -> AppResult<customer_entity::Model> {
        let existing = customer_entity::Entity::find()
            .filter(customer_entity::Column::UserId.eq(ctx.user_id))
            .one(conn)
            .await?;

        match existing {
            Some(customer) if customer.display_name == ctx.display_name => Ok(customer),
            Some(customer) => {
                let mut active: customer_entity::ActiveModel = customer.into();
                active.display_name = Set(ctx.display_name.clone());
                active.updated_at = Set(Utc::now());
                Ok(active.update(conn).await?)
            }
            None => {
                let now = Utc::now();
                let customer = customer_entity::ActiveModel {
                    user_id: Set(ctx.user_id),
                    display_name: Set(ctx.display_name.clone()),
                    total_points: Set(0),
                    available_points: Set(0),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(conn)
                .await?;
                Ok(customer)
            }
        }
    }

    async fn sum_points<C: ConnectionTrait>(
        &self,
        conn: &C,
        customer_id: i64,
        transaction_type: PointTransactionType,
    ) -> AppResult<i64> {
        let total: Option<Option<i64>> = point_transaction_entity::Entity::find()
            .select_only()
            .column_as(
                Expr::col(point_transaction_entity::Column::Points)
                    .sum()
                    .cast_as(Alias::new("BIGINT")),
                "total",
            )
            .filter(point_transaction_entity::Column::CustomerId.eq(customer_id))
            .filter(point_transaction_entity::Column::TransactionType.eq(transaction_type))
            .into_tuple()
            .one(conn)
            .await?;
        Ok(total.flatten().unwrap_or(0))
    }

    pub async fn loyalty_summary(&self, ctx: &AuthContext) -> AppResult<LoyaltySummaryResponse> {
        ctx.require(CUSTOMER_ONLY)?;
        let customer = self.find_or_create(&self.db, ctx).await?;

        let total_earned = self
            .sum_points(&self.db, customer.id, PointTransactionType::Earned)
            .await?;
        let total_redeemed = self
            .sum_points(&self.db, customer.id, PointTransactionType::Redeemed)
            .await?
            .abs();

        let next_reward = loyalty_program_entity::Entity::find()
            .filter(loyalty_program_entity::Column::IsActive.eq(true))
            .filter(loyalty_program_entity::Column::RequiredPoints.gt(customer.available_points))
            .order_by_asc(loyalty_program_entity::Column::RequiredPoints)
            .one(&self.db)
            .await?;

        Ok(LoyaltySummaryResponse {
            total_points: customer.total_points,
            available_points: customer.available_points,
            total_earned,
            total_redeemed,
            next_reward_points: next_reward.as_ref().map(|p| p.required_points).unwrap_or(0),
            next_reward_name: next_reward.map(|p| p.name),
        })
    }

    pub async fn transactions(
        &self,
        ctx: &AuthContext,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<PointTransactionResponse>> {
        ctx.require(CUSTOMER_ONLY)?;
        let customer = self.find_or_create(&self.db, ctx).await?;

        let total = point_transaction_entity::Entity::find()
            .filter(point_transaction_entity::Column::CustomerId.eq(customer.id))
            .count(&self.db)
            .await? as i64;
        let transactions = point_transaction_entity::Entity::find()
            .filter(point_transaction_entity::Column::CustomerId.eq(customer.id))
            .order_by_desc(point_transaction_entity::Column::CreatedAt)
            .order_by_desc(point_transaction_entity::Column::Id)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.db)
            .await?;

        Ok(PaginatedResponse::new(
            transactions.into_iter().map(Into::into).collect(),
            params.page.unwrap_or(1).max(1),
            params.get_limit(),
            total,
        ))
    }

    /// Credits earned points: raises both lifetime and available balances.
    pub async fn credit<C: ConnectionTrait>(
        &self,
        conn: &C,
        customer_id: i64,
        points: i64,
        description: String,
        payment_upload_id: Option<i64>,
    ) -> AppResult<()> {
        let result = customer_entity::Entity::update_many()
            .col_expr(
                customer_entity::Column::TotalPoints,
                Expr::col(customer_entity::Column::TotalPoints).add(points),
            )
            .col_expr(
                customer_entity::Column::AvailablePoints,
                Expr::col(customer_entity::Column::AvailablePoints).add(points),
            )
            .col_expr(customer_entity::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(customer_entity::Column::Id.eq(customer_id))
            .exec(conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Customer {customer_id} not found")));
        }

        point_transaction_entity::ActiveModel {
            customer_id: Set(customer_id),
            transaction_type: Set(PointTransactionType::Earned),
            points: Set(points),
            description: Set(description),
            payment_upload_id: Set(payment_upload_id),
            redemption_id: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        Ok(())
    }

    /// Returns points from a rejected redemption. Restores the available
    /// balance only; the lifetime total was never reduced by the debit.
    pub async fn refund<C: ConnectionTrait>(
        &self,
        conn: &C,
        customer_id: i64,
        points: i64,
        description: String,
        redemption_id: i64,
    ) -> AppResult<()> {
        let result = customer_entity::Entity::update_many()
            .col_expr(
                customer_entity::Column::AvailablePoints,
                Expr::col(customer_entity::Column::AvailablePoints).add(points),
            )
            .col_expr(customer_entity::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(customer_entity::Column::Id.eq(customer_id))
            .exec(conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Customer {customer_id} not found")));
        }

        point_transaction_entity::ActiveModel {
            customer_id: Set(customer_id),
            transaction_type: Set(PointTransactionType::Earned),
            points: Set(points),
            description: Set(description),
            payment_upload_id: Set(None),
            redemption_id: Set(Some(redemption_id)),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        Ok(())
    }

    /// Spends available points. The decrement is guarded by the balance in
    /// the same statement, so two concurrent debits can never overspend.
    pub async fn debit<C: ConnectionTrait>(
        &self,
        conn: &C,
        customer_id: i64,
        points: i64,
        description: String,
        redemption_id: i64,
    ) -> AppResult<()> {
        let result = customer_entity::Entity::update_many()
            .col_expr(
                customer_entity::Column::AvailablePoints,
                Expr::col(customer_entity::Column::AvailablePoints).sub(points),
            )
            .col_expr(customer_entity::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(customer_entity::Column::Id.eq(customer_id))
            .filter(customer_entity::Column::AvailablePoints.gte(points))
            .exec(conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::InsufficientPoints(format!(
                "Customer {customer_id} does not have {points} available points"
            )));
        }

        point_transaction_entity::ActiveModel {
            customer_id: Set(customer_id),
            transaction_type: Set(PointTransactionType::Redeemed),
            points: Set(-points),
            description: Set(description),
            payment_upload_id: Set(None),
            redemption_id: Set(Some(redemption_id)),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        Ok(())
    }
}
