use crate::entities::{
    booking_participant_entity, customer_entity, payment_upload_entity, AuditAction, UploadStatus,
};
use crate::error::{AppError, AppResult};
use crate::external::StorageService;
use crate::models::{
    AuthContext, PaginatedResponse, PaginationParams, ProofFile, SubmitUploadRequest,
    UploadResponse, VerifyDecision, VerifyUploadRequest, ADMIN_ROLES, CUSTOMER_ONLY,
};
use crate::services::{AuditService, LedgerService, SettingsService};
use chrono::{NaiveTime, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde_json::json;
use std::collections::HashMap;

const MAX_PROOF_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone)]
pub struct UploadService {
    db: DatabaseConnection,
    storage: StorageService,
    audit: AuditService,
    ledger: LedgerService,
    settings: SettingsService,
}

impl UploadService {
    pub fn new(
        db: DatabaseConnection,
        storage: StorageService,
        audit: AuditService,
        ledger: LedgerService,
        settings: SettingsService,
    ) -> Self {
        Self {
            db,
            storage,
            audit,
            ledger,
            settings,
        }
    }

    fn parse_time(value: &str) -> AppResult<NaiveTime> {
        NaiveTime::parse_from_str(value, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
            .map_err(|_| {
                AppError::ValidationError(format!("Invalid time \"{value}\", expected HH:MM"))
            })
    }

    /// Best-effort link from a free-text attendee name to a registered
    /// customer: case-insensitive substring match, lowest id wins.
    async fn match_participant<C: ConnectionTrait>(
        conn: &C,
        name: &str,
    ) -> AppResult<Option<i64>> {
        let matched = customer_entity::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(customer_entity::Column::DisplayName)))
                    .like(format!("%{}%", name.to_lowercase())),
            )
            .order_by_asc(customer_entity::Column::Id)
            .one(conn)
            .await?;
        Ok(matched.map(|c| c.id))
    }

    pub async fn submit(
        &self,
        ctx: &AuthContext,
        req: &SubmitUploadRequest,
        proof: ProofFile,
    ) -> AppResult<UploadResponse> {
        ctx.require(CUSTOMER_ONLY)?;

        let start = Self::parse_time(&req.start_time)?;
        let end = Self::parse_time(&req.end_time)?;
        if end <= start {
            return Err(AppError::ValidationError(
                "end_time must be after start_time".to_string(),
            ));
        }
        let start_at = req.booking_date.and_time(start).and_utc();
        let end_at = req.booking_date.and_time(end).and_utc();
        let minutes = (end_at - start_at).num_minutes();
        // Partial hours count as a full hour.
        let duration_hours = (minutes + 59) / 60;

        let participants: Vec<String> = req
            .participants
            .iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        if participants.is_empty() {
            return Err(AppError::ValidationError(
                "At least one participant is required".to_string(),
            ));
        }

        if let Some(amount) = req.total_amount {
            if amount < 0.0 {
                return Err(AppError::ValidationError(
                    "total_amount cannot be negative".to_string(),
                ));
            }
        }
        if proof.bytes.is_empty() || proof.bytes.len() > MAX_PROOF_BYTES {
            return Err(AppError::ValidationError(
                "Payment proof must be between 1 byte and 5 MiB".to_string(),
            ));
        }
        if !proof.content_type.starts_with("image/") {
            return Err(AppError::ValidationError(
                "Payment proof must be an image".to_string(),
            ));
        }

        let proof_url = self.storage.store_proof(&proof).await?;

        let txn = self.db.begin().await?;
        let customer = self.ledger.find_or_create(&txn, ctx).await?;
        let now = Utc::now();
        let upload = payment_upload_entity::ActiveModel {
            customer_id: Set(customer.id),
            booking_date: Set(req.booking_date),
            start_time: Set(start_at),
            end_time: Set(end_at),
            duration_hours: Set(duration_hours),
            payment_proof: Set(proof_url),
            total_amount: Set(req.total_amount),
            status: Set(UploadStatus::Pending),
            admin_notes: Set(None),
            approved_by: Set(None),
            approved_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut rows = Vec::with_capacity(participants.len());
        for name in &participants {
            let customer_id = Self::match_participant(&txn, name).await?;
            let row = booking_participant_entity::ActiveModel {
                payment_upload_id: Set(upload.id),
                customer_name: Set(name.clone()),
                customer_id: Set(customer_id),
                points_allocated: Set(0),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            rows.push(row);
        }

        self.audit
            .record(
                &txn,
                ctx,
                AuditAction::Create,
                "payment_upload",
                upload.id.to_string(),
                None,
                Some(json!({
                    "booking_date": upload.booking_date,
                    "duration_hours": upload.duration_hours,
                    "total_amount": upload.total_amount,
                    "participants": participants,
                })),
            )
            .await?;
        txn.commit().await?;

        Ok(UploadResponse::from_model(upload, rows, None))
    }

    async fn hydrate(
        &self,
        uploads: Vec<payment_upload_entity::Model>,
        with_customer_names: bool,
    ) -> AppResult<Vec<UploadResponse>> {
        let upload_ids: Vec<i64> = uploads.iter().map(|u| u.id).collect();
        let mut participants: HashMap<i64, Vec<booking_participant_entity::Model>> = HashMap::new();
        if !upload_ids.is_empty() {
            for row in booking_participant_entity::Entity::find()
                .filter(booking_participant_entity::Column::PaymentUploadId.is_in(upload_ids))
                .order_by_asc(booking_participant_entity::Column::Id)
                .all(&self.db)
                .await?
            {
                participants.entry(row.payment_upload_id).or_default().push(row);
            }
        }

        let mut names: HashMap<i64, String> = HashMap::new();
        if with_customer_names {
            let customer_ids: Vec<i64> = uploads.iter().map(|u| u.customer_id).collect();
            if !customer_ids.is_empty() {
                for customer in customer_entity::Entity::find()
                    .filter(customer_entity::Column::Id.is_in(customer_ids))
                    .all(&self.db)
                    .await?
                {
                    names.insert(customer.id, customer.display_name);
                }
            }
        }

        Ok(uploads
            .into_iter()
            .map(|upload| {
                let rows = participants.remove(&upload.id).unwrap_or_default();
                let name = names.get(&upload.customer_id).cloned();
                UploadResponse::from_model(upload, rows, name)
            })
            .collect())
    }

    pub async fn my_uploads(
        &self,
        ctx: &AuthContext,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<UploadResponse>> {
        ctx.require(CUSTOMER_ONLY)?;
        let customer = self.ledger.find_or_create(&self.db, ctx).await?;

        let base = payment_upload_entity::Entity::find()
            .filter(payment_upload_entity::Column::CustomerId.eq(customer.id));
        let total = base.clone().count(&self.db).await? as i64;
        let uploads = base
            .order_by_desc(payment_upload_entity::Column::CreatedAt)
            .order_by_desc(payment_upload_entity::Column::Id)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.db)
            .await?;

        Ok(PaginatedResponse::new(
            self.hydrate(uploads, false).await?,
            params.page.unwrap_or(1).max(1),
            params.get_limit(),
            total,
        ))
    }

    /// Review queue for admins, oldest submission first.
    pub async fn list_pending(
        &self,
        ctx: &AuthContext,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<UploadResponse>> {
        ctx.require(ADMIN_ROLES)?;

        let base = payment_upload_entity::Entity::find()
            .filter(payment_upload_entity::Column::Status.eq(UploadStatus::Pending));
        let total = base.clone().count(&self.db).await? as i64;
        let uploads = base
            .order_by_asc(payment_upload_entity::Column::CreatedAt)
            .order_by_asc(payment_upload_entity::Column::Id)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.db)
            .await?;

        Ok(PaginatedResponse::new(
            self.hydrate(uploads, true).await?,
            params.page.unwrap_or(1).max(1),
            params.get_limit(),
            total,
        ))
    }

    /// Settles a pending upload. On approval, total points are
    /// duration_hours * points_per_hour, split evenly (floor) across the
    /// participants who matched a registered customer at submission time.
    pub async fn verify(
        &self,
        ctx: &AuthContext,
        upload_id: i64,
        req: &VerifyUploadRequest,
    ) -> AppResult<UploadResponse> {
        ctx.require(ADMIN_ROLES)?;

        if let Some(pph) = req.points_per_hour {
            if pph <= 0 {
                return Err(AppError::ValidationError(
                    "points_per_hour must be positive".to_string(),
                ));
            }
        }

        let txn = self.db.begin().await?;
        let upload = payment_upload_entity::Entity::find_by_id(upload_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Upload {upload_id} not found")))?;

        let new_status = match req.decision {
            VerifyDecision::Approve => UploadStatus::Approved,
            VerifyDecision::Reject => UploadStatus::Rejected,
        };
        let now = Utc::now();

        // Guarding on the pending status makes the transition at-most-once
        // even when two admins settle the same upload concurrently.
        let result = payment_upload_entity::Entity::update_many()
            .col_expr(payment_upload_entity::Column::Status, Expr::value(new_status))
            .col_expr(
                payment_upload_entity::Column::ApprovedBy,
                Expr::value(Some(ctx.user_id)),
            )
            .col_expr(
                payment_upload_entity::Column::ApprovedAt,
                Expr::value(Some(now)),
            )
            .col_expr(
                payment_upload_entity::Column::AdminNotes,
                Expr::value(req.admin_notes.clone()),
            )
            .col_expr(payment_upload_entity::Column::UpdatedAt, Expr::value(now))
            .filter(payment_upload_entity::Column::Id.eq(upload_id))
            .filter(payment_upload_entity::Column::Status.eq(UploadStatus::Pending))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::StateError(format!(
                "Upload {upload_id} has already been processed"
            )));
        }

        if matches!(req.decision, VerifyDecision::Approve) {
            let points_per_hour = match req.points_per_hour {
                Some(pph) => pph,
                None => self.settings.points_per_hour(&txn).await?,
            };
            let total_points = upload.duration_hours * points_per_hour;

            let registered: Vec<booking_participant_entity::Model> =
                booking_participant_entity::Entity::find()
                    .filter(booking_participant_entity::Column::PaymentUploadId.eq(upload_id))
                    .filter(booking_participant_entity::Column::CustomerId.is_not_null())
                    .order_by_asc(booking_participant_entity::Column::Id)
                    .all(&txn)
                    .await?;

            if !registered.is_empty() {
                let share = total_points / registered.len() as i64;
                for participant in &registered {
                    let customer_id = participant
                        .customer_id
                        .ok_or_else(|| AppError::InternalError("Participant lost its customer".to_string()))?;
                    // A zero share still gets its ledger row, one earned
                    // transaction per registered participant.
                    self.ledger
                        .credit(
                            &txn,
                            customer_id,
                            share,
                            format!(
                                "Booking on {} ({} h)",
                                upload.booking_date, upload.duration_hours
                            ),
                            Some(upload_id),
                        )
                        .await?;
                    let mut active: booking_participant_entity::ActiveModel =
                        participant.clone().into();
                    active.points_allocated = Set(share);
                    active.update(&txn).await?;
                }
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
                "payment_upload",
                upload_id.to_string(),
                Some(json!({ "status": upload.status })),
                Some(json!({ "status": new_status, "admin_notes": req.admin_notes })),
            )
            .await?;

        let settled = payment_upload_entity::Entity::find_by_id(upload_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Upload {upload_id} not found")))?;
        let rows = booking_participant_entity::Entity::find()
            .filter(booking_participant_entity::Column::PaymentUploadId.eq(upload_id))
            .order_by_asc(booking_participant_entity::Column::Id)
            .all(&txn)
            .await?;
        txn.commit().await?;

        Ok(UploadResponse::from_model(settled, rows, None))
    }
}
