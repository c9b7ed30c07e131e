use crate::middlewares::get_auth_context;
use crate::models::*;
use crate::services::LedgerService;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError, Result};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/v1/customer/loyalty",
    tag = "loyalty",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Loyalty summary for the calling customer", body = LoyaltySummaryResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not a customer")
    )
)]
pub async fn get_loyalty_summary(
    ledger_service: web::Data<LedgerService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };

    match ledger_service.loyalty_summary(&ctx).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/customer/transactions",
    tag = "loyalty",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Point transaction history, newest first"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_point_history(
    ledger_service: web::Data<LedgerService>,
    req: HttpRequest,
    query: web::Query<PointHistoryQuery>,
) -> Result<HttpResponse> {
    let ctx = match get_auth_context(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };
    let params = PaginationParams::new(query.page, query.per_page);

    match ledger_service.transactions(&ctx, &params).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn loyalty_config(cfg: &mut web::ServiceConfig) {
    // Plain routes: a bare /customer scope would claim the whole prefix and
    // shadow the other customer endpoint groups.
    cfg.route("/customer/loyalty", web::get().to(get_loyalty_summary))
        .route("/customer/transactions", web::get().to(get_point_history));
}
