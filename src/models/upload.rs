use crate::entities::{booking_participant_entity, payment_upload_entity, UploadStatus};
use crate::models::VerifyDecision;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Proof image carried base64-encoded in the JSON body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProofUpload {
    pub content_type: String,
    /// Base64-encoded file bytes.
    pub data: String,
}

/// Decoded proof handed to the upload service by the handler.
#[derive(Debug, Clone)]
pub struct ProofFile {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitUploadRequest {
    pub booking_date: NaiveDate,
    /// Booking start, `HH:MM` or `HH:MM:SS`.
    pub start_time: String,
    /// Booking end, `HH:MM` or `HH:MM:SS`.
    pub end_time: String,
    pub total_amount: Option<f64>,
    /// One display name per attendee; at least one non-blank entry.
    pub participants: Vec<String>,
    pub payment_proof: ProofUpload,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ParticipantResponse {
    pub id: i64,
    pub customer_name: String,
    pub customer_id: Option<i64>,
    pub points_allocated: i64,
}

impl From<booking_participant_entity::Model> for ParticipantResponse {
    fn from(p: booking_participant_entity::Model) -> Self {
        Self {
            id: p.id,
            customer_name: p.customer_name,
            customer_id: p.customer_id,
            points_allocated: p.points_allocated,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub id: i64,
    pub customer_id: i64,
    /// Submitter display name, populated on admin listings.
    pub customer_name: Option<String>,
    pub booking_date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_hours: i64,
    pub payment_proof: String,
    pub total_amount: Option<f64>,
    pub status: UploadStatus,
    pub admin_notes: Option<String>,
    pub approved_by: Option<i64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<ParticipantResponse>,
}

impl UploadResponse {
    pub fn from_model(
        upload: payment_upload_entity::Model,
        participants: Vec<booking_participant_entity::Model>,
        customer_name: Option<String>,
    ) -> Self {
        Self {
            id: upload.id,
            customer_id: upload.customer_id,
            customer_name,
            booking_date: upload.booking_date,
            start_time: upload.start_time,
            end_time: upload.end_time,
            duration_hours: upload.duration_hours,
            payment_proof: upload.payment_proof,
            total_amount: upload.total_amount,
            status: upload.status,
            admin_notes: upload.admin_notes,
            approved_by: upload.approved_by,
            approved_at: upload.approved_at,
            created_at: upload.created_at,
            participants: participants.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyUploadRequest {
    pub decision: VerifyDecision,
    /// Overrides the `default_points_per_hour` setting when present.
    pub points_per_hour: Option<i64>,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
