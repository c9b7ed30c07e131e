use crate::middlewares::get_auth_context;
use crate::models::*;
use crate::services::ProgramService;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError, Result};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/v1/customer/rewards",
    tag = "programs",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Active rewards with per-caller eligibility", body = [RewardResponse]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_available_rewards(
    program_service: web::Data<ProgramService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };

    match program_service.available_rewards(&ctx).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/programs",
    tag = "programs",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All programs, newest first"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_programs(
    program_service: web::Data<ProgramService>,
    req: HttpRequest,
    query: web::Query<ProgramQuery>,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };
    let params = PaginationParams::new(query.page, query.per_page);

    match program_service.list(&ctx, &params).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/programs",
    tag = "programs",
    request_body = CreateProgramRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Program created", body = ProgramResponse),
        (status = 400, description = "Invalid program fields")
    )
)]
pub async fn create_program(
    program_service: web::Data<ProgramService>,
    req: HttpRequest,
    request: web::Json<CreateProgramRequest>,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };

    match program_service.create(&ctx, &request).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/programs/{id}",
    tag = "programs",
    params(
        ("id" = i64, Path, description = "Program id")
    ),
    request_body = UpdateProgramRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Program updated", body = ProgramResponse),
        (status = 404, description = "Unknown program")
    )
)]
pub async fn update_program(
    program_service: web::Data<ProgramService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateProgramRequest>,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };

    match program_service
        .update(&ctx, path.into_inner(), &request)
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
    post,
    path = "/api/v1/admin/programs/{id}/toggle",
    tag = "programs",
    params(
        ("id" = i64, Path, description = "Program id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Program active flag flipped", body = ProgramResponse),
        (status = 404, description = "Unknown program")
    )
)]
pub async fn toggle_program(
    program_service: web::Data<ProgramService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };

    match program_service.toggle(&ctx, path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/programs/{id}",
    tag = "programs",
    params(
        ("id" = i64, Path, description = "Program id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Program deleted"),
        (status = 404, description = "Unknown program"),
        (status = 409, description = "Program has redemptions")
    )
)]
pub async fn delete_program(
    program_service: web::Data<ProgramService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };

    match program_service.delete(&ctx, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": null
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn program_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/customer/rewards").route("", web::get().to(get_available_rewards)));
    cfg.service(
        web::scope("/admin/programs")
            .route("", web::get().to(list_programs))
            .route("", web::post().to(create_program))
            .route("/{id}", web::put().to(update_program))
            .route("/{id}", web::delete().to(delete_program))
            .route("/{id}/toggle", web::post().to(toggle_program)),
    );
}
