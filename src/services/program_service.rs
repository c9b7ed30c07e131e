use crate::entities::{loyalty_program_entity, redemption_entity, AuditAction};
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthContext, CreateProgramRequest, PaginatedResponse, PaginationParams, ProgramResponse,
    RewardResponse, UpdateProgramRequest, ADMIN_ROLES, CUSTOMER_ONLY,
};
use crate::services::{AuditService, LedgerService};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde_json::json;

#[derive(Clone)]
pub struct ProgramService {
    db: DatabaseConnection,
    audit: AuditService,
    ledger: LedgerService,
}

impl ProgramService {
    pub fn new(db: DatabaseConnection, audit: AuditService, ledger: LedgerService) -> Self {
        Self { db, audit, ledger }
    }

    fn validate(name: &str, required_points: i64, max_redemptions: Option<i64>) -> AppResult<()> {
        if name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Program name cannot be empty".to_string(),
            ));
        }
        if required_points <= 0 {
            return Err(AppError::ValidationError(
                "required_points must be positive".to_string(),
            ));
        }
        if let Some(max) = max_redemptions {
            if max <= 0 {
                return Err(AppError::ValidationError(
                    "max_redemptions must be positive when set".to_string(),
                ));
            }
        }
        Ok(())
    }

    async fn find_program(&self, id: i64) -> AppResult<loyalty_program_entity::Model> {
        loyalty_program_entity::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Program {id} not found")))
    }

    fn snapshot(program: &loyalty_program_entity::Model) -> serde_json::Value {
        json!({
            "name": program.name,
            "description": program.description,
            "required_points": program.required_points,
            "is_active": program.is_active,
            "max_redemptions": program.max_redemptions,
        })
    }

    pub async fn list(
        &self,
        ctx: &AuthContext,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<ProgramResponse>> {
        ctx.require(ADMIN_ROLES)?;

        let total = loyalty_program_entity::Entity::find().count(&self.db).await? as i64;
        let programs = loyalty_program_entity::Entity::find()
            .order_by_desc(loyalty_program_entity::Column::CreatedAt)
            .order_by_desc(loyalty_program_entity::Column::Id)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.db)
            .await?;

        Ok(PaginatedResponse::new(
            programs.into_iter().map(Into::into).collect(),
            params.page.unwrap_or(1).max(1),
            params.get_limit(),
            total,
        ))
    }

    /// Reward catalogue for the calling customer: active programs ordered by
    /// price, each flagged with whether this customer can afford it right now.
    pub async fn available_rewards(&self, ctx: &AuthContext) -> AppResult<Vec<RewardResponse>> {
        ctx.require(CUSTOMER_ONLY)?;
        let customer = self.ledger.find_or_create(&self.db, ctx).await?;

        let programs = loyalty_program_entity::Entity::find()
            .filter(loyalty_program_entity::Column::IsActive.eq(true))
            .order_by_asc(loyalty_program_entity::Column::RequiredPoints)
            .all(&self.db)
            .await?;

        Ok(programs
            .into_iter()
            .map(|program| {
                let exhausted = program
                    .max_redemptions
                    .map(|max| program.current_redemptions >= max)
                    .unwrap_or(false);
                let can_redeem =
                    !exhausted && customer.available_points >= program.required_points;
                RewardResponse {
                    program: program.into(),
                    can_redeem,
                    available_points: customer.available_points,
                }
            })
            .collect())
    }

    pub async fn create(
        &self,
        ctx: &AuthContext,
        req: &CreateProgramRequest,
    ) -> AppResult<ProgramResponse> {
        ctx.require(ADMIN_ROLES)?;
        Self::validate(&req.name, req.required_points, req.max_redemptions)?;

        let txn = self.db.begin().await?;
        let now = Utc::now();
        let program = loyalty_program_entity::ActiveModel {
            name: Set(req.name.trim().to_string()),
            description: Set(req.description.clone()),
            required_points: Set(req.required_points),
            is_active: Set(true),
            max_redemptions: Set(req.max_redemptions),
            current_redemptions: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        self.audit
            .record(
                &txn,
                ctx,
                AuditAction::Create,
                "loyalty_program",
                program.id.to_string(),
                None,
                Some(Self::snapshot(&program)),
            )
            .await?;
        txn.commit().await?;

        Ok(program.into())
    }

    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: i64,
        req: &UpdateProgramRequest,
    ) -> AppResult<ProgramResponse> {
        ctx.require(ADMIN_ROLES)?;
        Self::validate(&req.name, req.required_points, req.max_redemptions)?;

        let program = self.find_program(id).await?;
        let old = Self::snapshot(&program);

        let txn = self.db.begin().await?;
        let mut active: loyalty_program_entity::ActiveModel = program.into();
        active.name = Set(req.name.trim().to_string());
        active.description = Set(req.description.clone());
        active.required_points = Set(req.required_points);
        active.max_redemptions = Set(req.max_redemptions);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        self.audit
            .record(
                &txn,
                ctx,
                AuditAction::Update,
                "loyalty_program",
                id.to_string(),
                Some(old),
                Some(Self::snapshot(&updated)),
            )
            .await?;
        txn.commit().await?;

        Ok(updated.into())
    }

    pub async fn toggle(&self, ctx: &AuthContext, id: i64) -> AppResult<ProgramResponse> {
        ctx.require(ADMIN_ROLES)?;

        let program = self.find_program(id).await?;
        let old = Self::snapshot(&program);
        let new_state = !program.is_active;

        let txn = self.db.begin().await?;
        let mut active: loyalty_program_entity::ActiveModel = program.into();
        active.is_active = Set(new_state);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        self.audit
            .record(
                &txn,
                ctx,
                AuditAction::Update,
                "loyalty_program",
                id.to_string(),
                Some(old),
                Some(Self::snapshot(&updated)),
            )
            .await?;
        txn.commit().await?;

        Ok(updated.into())
    }

    /// Deleting is refused once any redemption references the program; the
    /// redemption history must keep resolving. Deactivate instead.
    pub async fn delete(&self, ctx: &AuthContext, id: i64) -> AppResult<()> {
        ctx.require(ADMIN_ROLES)?;

        let program = self.find_program(id).await?;
        let references = redemption_entity::Entity::find()
            .filter(redemption_entity::Column::ProgramId.eq(id))
            .count(&self.db)
            .await?;
        if references > 0 {
            return Err(AppError::Conflict(format!(
                "Program {id} has redemptions and cannot be deleted; deactivate it instead"
            )));
        }

        let old = Self::snapshot(&program);
        let txn = self.db.begin().await?;
        program.delete(&txn).await?;
        self.audit
            .record(
                &txn,
                ctx,
                AuditAction::Delete,
                "loyalty_program",
                id.to_string(),
                Some(old),
                None,
            )
            .await?;
        txn.commit().await?;
        Ok(())
    }
}
