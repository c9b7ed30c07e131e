use crate::entities::{
    customer_entity, loyalty_program_entity, redemption_entity, AuditAction, RedemptionStatus,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthContext, PaginatedResponse, PaginationParams, RedemptionResponse, VerifyDecision,
    VerifyRedemptionRequest, ADMIN_ROLES, CUSTOMER_ONLY,
};
use crate::services::{AuditService, LedgerService, SettingsService};
use crate::utils::generate_qr_token;
use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde_json::json;
use std::collections::HashMap;

#[derive(Clone)]
pub struct RedemptionService {
    db: DatabaseConnection,
    audit: AuditService,
    ledger: LedgerService,
    settings: SettingsService,
}

impl RedemptionService {
    pub fn new(
        db: DatabaseConnection,
        audit: AuditService,
        ledger: LedgerService,
        settings: SettingsService,
    ) -> Self {
        Self {
            db,
            audit,
            ledger,
            settings,
        }
    }

    /// Customer spends points on a reward. Points are deducted immediately;
    /// the QR code stays pending until an admin approves it.
    pub async fn redeem(&self, ctx: &AuthContext, program_id: i64) -> AppResult<RedemptionResponse> {
        ctx.require(CUSTOMER_ONLY)?;

        let txn = self.db.begin().await?;
        let customer = self.ledger.find_or_create(&txn, ctx).await?;

        let program = loyalty_program_entity::Entity::find_by_id(program_id)
            .one(&txn)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| AppError::NotFound(format!("Program {program_id} not found")))?;

        if let Some(max) = program.max_redemptions {
            if program.current_redemptions >= max {
                return Err(AppError::Exhausted(format!(
                    "Program {program_id} has reached its redemption limit"
                )));
            }
        }

        let expiry_hours = self.settings.qr_expiry_hours(&txn).await?;
        let now = Utc::now();
        let redemption = redemption_entity::ActiveModel {
            customer_id: Set(customer.id),
            program_id: Set(program.id),
            status: Set(RedemptionStatus::Pending),
            // Frozen here; later program edits do not change what was paid.
            points_used: Set(program.required_points),
            qr_code: Set(generate_qr_token()),
            qr_code_expiry: Set(Some(now + Duration::hours(expiry_hours))),
            approved_by: Set(None),
            approved_at: Set(None),
            used_at: Set(None),
            admin_notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        self.ledger
            .debit(
                &txn,
                customer.id,
                program.required_points,
                format!("Redeemed \"{}\"", program.name),
                redemption.id,
            )
            .await?;

        self.audit
            .record(
                &txn,
                ctx,
                AuditAction::Create,
                "redemption",
                redemption.id.to_string(),
                None,
                Some(json!({
                    "program_id": program.id,
                    "points_used": redemption.points_used,
                })),
            )
            .await?;
        txn.commit().await?;

        Ok(RedemptionResponse::from_model(
            redemption,
            None,
            Some(program.name),
        ))
    }

    async fn hydrate(
        &self,
        redemptions: Vec<redemption_entity::Model>,
        with_customer_names: bool,
    ) -> AppResult<Vec<RedemptionResponse>> {
        let program_ids: Vec<i64> = redemptions.iter().map(|r| r.program_id).collect();
        let mut program_names: HashMap<i64, String> = HashMap::new();
        if !program_ids.is_empty() {
            for program in loyalty_program_entity::Entity::find()
                .filter(loyalty_program_entity::Column::Id.is_in(program_ids))
                .all(&self.db)
                .await?
            {
                program_names.insert(program.id, program.name);
            }
        }

        let mut customer_names: HashMap<i64, String> = HashMap::new();
        if with_customer_names {
            let customer_ids: Vec<i64> = redemptions.iter().map(|r| r.customer_id).collect();
            if !customer_ids.is_empty() {
                for customer in customer_entity::Entity::find()
                    .filter(customer_entity::Column::Id.is_in(customer_ids))
                    .all(&self.db)
                    .await?
                {
                    customer_names.insert(customer.id, customer.display_name);
                }
            }
        }

        Ok(redemptions
            .into_iter()
            .map(|redemption| {
                let program_name = program_names.get(&redemption.program_id).cloned();
                let customer_name = customer_names.get(&redemption.customer_id).cloned();
                RedemptionResponse::from_model(redemption, customer_name, program_name)
            })
            .collect())
    }

    pub async fn my_redemptions(
        &self,
        ctx: &AuthContext,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<RedemptionResponse>> {
        ctx.require(CUSTOMER_ONLY)?;
        let customer = self.ledger.find_or_create(&self.db, ctx).await?;

        let base = redemption_entity::Entity::find()
            .filter(redemption_entity::Column::CustomerId.eq(customer.id));
        let total = base.clone().count(&self.db).await? as i64;
        let redemptions = base
            .order_by_desc(redemption_entity::Column::CreatedAt)
            .order_by_desc(redemption_entity::Column::Id)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.db)
            .await?;

        Ok(PaginatedResponse::new(
            self.hydrate(redemptions, false).await?,
            params.page.unwrap_or(1).max(1),
            params.get_limit(),
            total,
        ))
    }

    pub async fn list_pending(
        &self,
        ctx: &AuthContext,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<RedemptionResponse>> {
        ctx.require(ADMIN_ROLES)?;

        let base = redemption_entity::Entity::find()
            .filter(redemption_entity::Column::Status.eq(RedemptionStatus::Pending));
        let total = base.clone().count(&self.db).await? as i64;
        let redemptions = base
            .order_by_asc(redemption_entity::Column::CreatedAt)
            .order_by_asc(redemption_entity::Column::Id)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.db)
            .await?;

        Ok(PaginatedResponse::new(
            self.hydrate(redemptions, true).await?,
            params.page.unwrap_or(1).max(1),
            params.get_limit(),
            total,
        ))
    }

    /// Approves or rejects a pending redemption. Rejection returns the exact
    /// points the customer paid; approval counts against the program cap.
    pub async fn verify(
        &self,
        ctx: &AuthContext,
        redemption_id: i64,
        req: &VerifyRedemptionRequest,
    ) -> AppResult<RedemptionResponse> {
        ctx.require(ADMIN_ROLES)?;

        let txn = self.db.begin().await?;
        let redemption = redemption_entity::Entity::find_by_id(redemption_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Redemption {redemption_id} not found")))?;

        let new_status = match req.decision {
            VerifyDecision::Approve => RedemptionStatus::Approved,
            VerifyDecision::Reject => RedemptionStatus::Rejected,
        };
        let now = Utc::now();

        let result = redemption_entity::Entity::update_many()
            .col_expr(redemption_entity::Column::Status, Expr::value(new_status))
            .col_expr(
                redemption_entity::Column::ApprovedBy,
                Expr::value(Some(ctx.user_id)),
            )
            .col_expr(redemption_entity::Column::ApprovedAt, Expr::value(Some(now)))
            .col_expr(
                redemption_entity::Column::AdminNotes,
                Expr::value(req.admin_notes.clone()),
            )
            .col_expr(redemption_entity::Column::UpdatedAt, Expr::value(now))
            .filter(redemption_entity::Column::Id.eq(redemption_id))
            .filter(redemption_entity::Column::Status.eq(RedemptionStatus::Pending))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::StateError(format!(
                "Redemption {redemption_id} has already been processed"
            )));
        }

        match req.decision {
            VerifyDecision::Approve => {
                loyalty_program_entity::Entity::update_many()
                    .col_expr(
                        loyalty_program_entity::Column::CurrentRedemptions,
                        Expr::col(loyalty_program_entity::Column::CurrentRedemptions).add(1),
                    )
                    .col_expr(loyalty_program_entity::Column::UpdatedAt, Expr::value(now))
                    .filter(loyalty_program_entity::Column::Id.eq(redemption.program_id))
                    .exec(&txn)
                    .await?;
            }
            VerifyDecision::Reject => {
                self.ledger
                    .refund(
                        &txn,
                        redemption.customer_id,
                        redemption.points_used,
                        format!("Refund for rejected redemption {redemption_id}"),
                        redemption_id,
                    )
                    .await?;
            }
        }

        self.audit
            .record(
                &txn,
                ctx,
                match req.decision {
                    VerifyDecision::Approve => AuditAction::Approve,
                    VerifyDecision::Reject => AuditAction::Reject,
                },
                "redemption",
                redemption_id.to_string(),
                Some(json!({ "status": redemption.status })),
                Some(json!({ "status": new_status, "admin_notes": req.admin_notes })),
            )
            .await?;

        let settled = redemption_entity::Entity::find_by_id(redemption_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Redemption {redemption_id} not found")))?;
        txn.commit().await?;

        Ok(self
            .hydrate(vec![settled], true)
            .await?
            .pop()
            .ok_or_else(|| AppError::InternalError("Redemption vanished".to_string()))?)
    }

    /// Looks up a redemption by the exact QR token, for the admin scanner.
    pub async fn scan(&self, ctx: &AuthContext, qr_code: &str) -> AppResult<RedemptionResponse> {
        ctx.require(ADMIN_ROLES)?;

        let redemption = redemption_entity::Entity::find()
            .filter(redemption_entity::Column::QrCode.eq(qr_code))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Unknown QR code".to_string()))?;

        Ok(self
            .hydrate(vec![redemption], true)
            .await?
            .pop()
            .ok_or_else(|| AppError::InternalError("Redemption vanished".to_string()))?)
    }

    /// Marks an approved redemption as used when the customer collects the
    /// reward. An expired QR code is refused and the redemption stays
    /// approved, so an admin can still resolve it manually.
    pub async fn mark_used(
        &self,
        ctx: &AuthContext,
        redemption_id: i64,
    ) -> AppResult<RedemptionResponse> {
        ctx.require(ADMIN_ROLES)?;

        let txn = self.db.begin().await?;
        let redemption = redemption_entity::Entity::find_by_id(redemption_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Redemption {redemption_id} not found")))?;

        if redemption.status != RedemptionStatus::Approved {
            return Err(AppError::StateError(format!(
                "Redemption {redemption_id} is {}, expected approved",
                redemption.status
            )));
        }

        let now = Utc::now();
        if let Some(expiry) = redemption.qr_code_expiry {
            if now > expiry {
                return Err(AppError::Expired(format!(
                    "QR code for redemption {redemption_id} expired at {expiry}"
                )));
            }
        }

        let result = redemption_entity::Entity::update_many()
            .col_expr(
                redemption_entity::Column::Status,
                Expr::value(RedemptionStatus::Used),
            )
            .col_expr(redemption_entity::Column::UsedAt, Expr::value(Some(now)))
            .col_expr(redemption_entity::Column::UpdatedAt, Expr::value(now))
            .filter(redemption_entity::Column::Id.eq(redemption_id))
            .filter(redemption_entity::Column::Status.eq(RedemptionStatus::Approved))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::StateError(format!(
                "Redemption {redemption_id} has already been used"
            )));
        }

        self.audit
            .record(
                &txn,
                ctx,
                AuditAction::Update,
                "redemption",
                redemption_id.to_string(),
                Some(json!({ "status": RedemptionStatus::Approved })),
                Some(json!({ "status": RedemptionStatus::Used })),
            )
            .await?;

        let settled = redemption_entity::Entity::find_by_id(redemption_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Redemption {redemption_id} not found")))?;
        txn.commit().await?;

        Ok(self
            .hydrate(vec![settled], true)
            .await?
            .pop()
            .ok_or_else(|| AppError::InternalError("Redemption vanished".to_string()))?)
    }
}
