use crate::error::AppError;
use crate::middlewares::get_auth_context;
use crate::models::*;
use crate::services::UploadService;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/v1/customer/uploads",
    tag = "uploads",
    request_body = SubmitUploadRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Upload submitted for review", body = UploadResponse),
        (status = 400, description = "Invalid booking or proof"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn submit_upload(
    upload_service: web::Data<UploadService>,
    req: HttpRequest,
    request: web::Json<SubmitUploadRequest>,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };

    let bytes = match STANDARD.decode(&request.payment_proof.data) {
        Ok(bytes) => bytes,
        Err(_) => {
            let e = AppError::ValidationError("payment_proof.data is not valid base64".to_string());
            return Ok(e.error_response());
        }
    };
    let proof = ProofFile {
        bytes,
        content_type: request.payment_proof.content_type.clone(),
    };

    match upload_service.submit(&ctx, &request, proof).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/customer/uploads",
    tag = "uploads",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "The caller's uploads, newest first"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_my_uploads(
    upload_service: web::Data<UploadService>,
    req: HttpRequest,
    query: web::Query<UploadQuery>,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };
    let params = PaginationParams::new(query.page, query.per_page);

    match upload_service.my_uploads(&ctx, &params).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/uploads/pending",
    tag = "uploads",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Pending uploads, oldest first"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn get_pending_uploads(
    upload_service: web::Data<UploadService>,
    req: HttpRequest,
    query: web::Query<UploadQuery>,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };
    let params = PaginationParams::new(query.page, query.per_page);

    match upload_service.list_pending(&ctx, &params).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/uploads/{id}/verify",
    tag = "uploads",
    params(
        ("id" = i64, Path, description = "Upload id")
    ),
    request_body = VerifyUploadRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Upload settled", body = UploadResponse),
        (status = 404, description = "Unknown upload"),
        (status = 409, description = "Already processed")
    )
)]
pub async fn verify_upload(
    upload_service: web::Data<UploadService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<VerifyUploadRequest>,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };

    match upload_service
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

pub fn upload_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/customer/uploads")
            .route("", web::post().to(submit_upload))
            .route("", web::get().to(get_my_uploads)),
    );
    cfg.service(
        web::scope("/admin/uploads")
            .route("/pending", web::get().to(get_pending_uploads))
            .route("/{id}/verify", web::post().to(verify_upload)),
    );
}
