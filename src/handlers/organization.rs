use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

use super::{Access, tenant_id};
use crate::models::*;
use crate::services::OrganizationService;

#[utoipa::path(
    get,
    path = "/organization",
    tag = "organization",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Organization of the caller with its tiers", body = OrganizationResponse),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Tier configuration is unusable")
    )
)]
pub async fn get_organization(
    organization_service: web::Data<OrganizationService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let org_id = match tenant_id(&req, Access::Member) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match organization_service.get_organization(org_id).await {
        Ok(org) => Ok(HttpResponse::Ok().json(ApiResponse::success(org))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/organization/settings",
    tag = "organization",
    request_body = UpdateOrganizationSettingsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Settings updated", body = OrganizationResponse),
        (status = 400, description = "Invalid settings"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn update_settings(
    organization_service: web::Data<OrganizationService>,
    req: HttpRequest,
    request: web::Json<UpdateOrganizationSettingsRequest>,
) -> Result<HttpResponse> {
    let org_id = match tenant_id(&req, Access::Manager) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match organization_service
        .update_settings(org_id, request.into_inner())
        .await
    {
        Ok(org) => Ok(HttpResponse::Ok().json(ApiResponse::success(org))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn organization_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/organization")
            .route("", web::get().to(get_organization))
            .route("/settings", web::put().to(update_settings)),
    );
}
