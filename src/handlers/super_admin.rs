use crate::middlewares::get_auth_context;
use crate::models::*;
use crate::services::{AuditService, StatsService};
use actix_web::{web, HttpRequest, HttpResponse, ResponseError, Result};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/v1/super-admin/stats",
    tag = "super-admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "System-wide counters", body = SystemStatsResponse),
        (status = 403, description = "Not a super admin")
    )
)]
pub async fn get_system_stats(
    stats_service: web::Data<StatsService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };

    match stats_service.system_stats(&ctx).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/super-admin/audit-logs",
    tag = "super-admin",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Audit trail, newest first"),
        (status = 403, description = "Not a super admin")
    )
)]
pub async fn get_audit_logs(
    audit_service: web::Data<AuditService>,
    req: HttpRequest,
    query: web::Query<AuditLogQuery>,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };
    let params = PaginationParams::new(query.page, query.per_page);

    match audit_service.list(&ctx, &params).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn super_admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/super-admin")
            .route("/stats", web::get().to(get_system_stats))
            .route("/audit-logs", web::get().to(get_audit_logs)),
    );
}
