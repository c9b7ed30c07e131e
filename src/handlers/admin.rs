use crate::middlewares::get_auth_context;
use crate::models::*;
use crate::services::SettingsService;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError, Result};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/v1/admin/settings",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Current system settings", body = SystemSettingsResponse),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn get_settings(
    settings_service: web::Data<SettingsService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };

    match settings_service.get_settings(&ctx).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/settings",
    tag = "admin",
    request_body = UpdateSettingsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Settings updated", body = SystemSettingsResponse),
        (status = 400, description = "Invalid setting value"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn update_settings(
    settings_service: web::Data<SettingsService>,
    req: HttpRequest,
    request: web::Json<UpdateSettingsRequest>,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };

    match settings_service.update_settings(&ctx, &request).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin/settings")
            .route("", web::get().to(get_settings))
            .route("", web::put().to(update_settings)),
    );
}
