use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

use super::{Access, tenant_id};
use crate::models::*;
use crate::services::TierService;

#[utoipa::path(
    get,
    path = "/tiers",
    tag = "tier",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Tiers ascending by threshold", body = [Tier]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_tiers(
    tier_service: web::Data<TierService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let org_id = match tenant_id(&req, Access::Member) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match tier_service.list_tiers(org_id).await {
        Ok(tiers) => Ok(HttpResponse::Ok().json(ApiResponse::success(tiers))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/tiers",
    tag = "tier",
    request_body = ReplaceTiersRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Tiers replaced and customers re-tiered", body = ReplaceTiersResponse),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Invalid tier configuration")
    )
)]
pub async fn replace_tiers(
    tier_service: web::Data<TierService>,
    req: HttpRequest,
    request: web::Json<ReplaceTiersRequest>,
) -> Result<HttpResponse> {
    let org_id = match tenant_id(&req, Access::Manager) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match tier_service
        .replace_tiers(org_id, request.into_inner().tiers)
        .await
    {
        Ok(resp) => Ok(HttpResponse::Ok().json(ApiResponse::success(resp))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/tiers/resolve",
    tag = "tier",
    params(ResolveTierQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Tier for the given balance", body = ResolvedTierResponse),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Tier configuration is unusable")
    )
)]
pub async fn resolve_tier(
    tier_service: web::Data<TierService>,
    req: HttpRequest,
    query: web::Query<ResolveTierQuery>,
) -> Result<HttpResponse> {
    let org_id = match tenant_id(&req, Access::Member) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match tier_service.resolve_for_points(org_id, query.points).await {
        Ok(resolved) => Ok(HttpResponse::Ok().json(ApiResponse::success(resolved))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn tier_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tiers")
            .route("", web::get().to(list_tiers))
            .route("", web::put().to(replace_tiers))
            .route("/resolve", web::get().to(resolve_tier)),
    );
}
