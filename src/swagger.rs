use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{AuditAction, PointTransactionType, RedemptionStatus, UploadStatus};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::loyalty::get_loyalty_summary,
        handlers::loyalty::get_point_history,
        handlers::upload::submit_upload,
        handlers::upload::get_my_uploads,
        handlers::upload::get_pending_uploads,
        handlers::upload::verify_upload,
        handlers::redemption::redeem_reward,
        handlers::redemption::get_my_redemptions,
        handlers::redemption::get_pending_redemptions,
        handlers::redemption::verify_redemption,
        handlers::redemption::scan_qr_code,
        handlers::redemption::mark_redemption_used,
        handlers::program::get_available_rewards,
        handlers::program::list_programs,
        handlers::program::create_program,
        handlers::program::update_program,
        handlers::program::toggle_program,
        handlers::program::delete_program,
        handlers::admin::get_settings,
        handlers::admin::update_settings,
        handlers::super_admin::get_system_stats,
        handlers::super_admin::get_audit_logs,
    ),
    components(
        schemas(
            Role,
            VerifyDecision,
            LoyaltySummaryResponse,
            PointTransactionType,
            PointTransactionResponse,
            PointHistoryQuery,
            UploadStatus,
            ProofUpload,
            SubmitUploadRequest,
            ParticipantResponse,
            UploadResponse,
            VerifyUploadRequest,
            UploadQuery,
            RedemptionStatus,
            RedeemRequest,
            RedemptionResponse,
            VerifyRedemptionRequest,
            RedemptionQuery,
            ProgramResponse,
            RewardResponse,
            CreateProgramRequest,
            UpdateProgramRequest,
            ProgramQuery,
            AuditAction,
            AuditLogResponse,
            AuditLogQuery,
            SystemSettingsResponse,
            UpdateSettingsRequest,
            SystemStatsResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "loyalty", description = "Customer points and history"),
        (name = "uploads", description = "Payment proof uploads and verification"),
        (name = "redemptions", description = "Reward redemptions and QR workflow"),
        (name = "programs", description = "Loyalty program management"),
        (name = "admin", description = "System settings"),
        (name = "super-admin", description = "Statistics and audit trail"),
    ),
    info(
        title = "Balls Loyalty Backend API",
        version = "1.0.0",
        description = "Loyalty rewards REST API for venue bookings",
    ),
    servers(
        (url = "/", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
