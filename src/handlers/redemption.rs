use crate::middlewares::get_auth_context;
use crate::models::*;
use crate::services::RedemptionService;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError, Result};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/v1/customer/redemptions",
    tag = "redemptions",
    request_body = RedeemRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Redemption created with a pending QR code", body = RedemptionResponse),
        (status = 404, description = "Unknown or inactive program"),
        (status = 409, description = "Redemption limit reached"),
        (status = 422, description = "Not enough available points")
    )
)]
pub async fn redeem_reward(
    redemption_service: web::Data<RedemptionService>,
    req: HttpRequest,
    request: web::Json<RedeemRequest>,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };

    match redemption_service.redeem(&ctx, request.program_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/customer/redemptions",
    tag = "redemptions",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "The caller's redemptions, newest first"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_my_redemptions(
    redemption_service: web::Data<RedemptionService>,
    req: HttpRequest,
    query: web::Query<RedemptionQuery>,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };
    let params = PaginationParams::new(query.page, query.per_page);

    match redemption_service.my_redemptions(&ctx, &params).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/redemptions/pending",
    tag = "redemptions",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Pending redemptions, oldest first"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn get_pending_redemptions(
    redemption_service: web::Data<RedemptionService>,
    req: HttpRequest,
    query: web::Query<RedemptionQuery>,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };
    let params = PaginationParams::new(query.page, query.per_page);

    match redemption_service.list_pending(&ctx, &params).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/redemptions/{id}/verify",
    tag = "redemptions",
    params(
        ("id" = i64, Path, description = "Redemption id")
    ),
    request_body = VerifyRedemptionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Redemption settled", body = RedemptionResponse),
        (status = 404, description = "Unknown redemption"),
        (status = 409, description = "Already processed")
    )
)]
pub async fn verify_redemption(
    redemption_service: web::Data<RedemptionService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<VerifyRedemptionRequest>,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };

    match redemption_service
        .verify(&ctx, path.into_inner(), &request)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/redemptions/scan/{qr_code}",
    tag = "redemptions",
    params(
        ("qr_code" = String, Path, description = "QR token to look up")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Redemption behind the QR code", body = RedemptionResponse),
        (status = 404, description = "Unknown QR code")
    )
)]
pub async fn scan_qr_code(
    redemption_service: web::Data<RedemptionService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };

    match redemption_service.scan(&ctx, &path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/redemptions/{id}/use",
    tag = "redemptions",
    params(
        ("id" = i64, Path, description = "Redemption id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Redemption marked as used", body = RedemptionResponse),
        (status = 409, description = "Not in the approved state"),
        (status = 410, description = "QR code expired")
    )
)]
pub async fn mark_redemption_used(
    redemption_service: web::Data<RedemptionService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };

    match redemption_service.mark_used(&ctx, path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn redemption_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/customer/redemptions")
            .route("", web::post().to(redeem_reward))
            .route("", web::get().to(get_my_redemptions)),
    );
    cfg.service(
        web::scope("/admin/redemptions")
            .route("/pending", web::get().to(get_pending_redemptions))
            .route("/scan/{qr_code}", web::get().to(scan_qr_code))
            .route("/{id}/verify", web::post().to(verify_redemption))
            .route("/{id}/use", web::post().to(mark_redemption_used)),
    );
}
