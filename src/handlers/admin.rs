use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

use super::{Access, require_service_role, tenant_id};
use crate::models::*;
use crate::services::{OrganizationService, ReconciliationService};

#[utoipa::path(
    post,
    path = "/admin/organizations",
    tag = "admin",
    request_body = CreateOrganizationRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Organization created", body = OrganizationResponse),
        (status = 400, description = "Invalid request or slug taken"),
        (status = 403, description = "Service role required"),
        (status = 422, description = "Invalid tier configuration")
    )
)]
pub async fn create_organization(
    organization_service: web::Data<OrganizationService>,
    req: HttpRequest,
    request: web::Json<CreateOrganizationRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_service_role(&req) {
        return Ok(e.error_response());
    }

    match organization_service
        .create_organization(request.into_inner())
        .await
    {
        Ok(org) => Ok(HttpResponse::Created().json(ApiResponse::success(org))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/reconcile",
    tag = "admin",
    params(ReconcileQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All organizations reconciled", body = ReconciliationSummary),
        (status = 403, description = "Service role required")
    )
)]
pub async fn reconcile_all(
    reconciliation_service: web::Data<ReconciliationService>,
    req: HttpRequest,
    query: web::Query<ReconcileQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_service_role(&req) {
        return Ok(e.error_response());
    }

    match reconciliation_service
        .reconcile_all(query.dry_run.unwrap_or(false))
        .await
    {
        Ok(summary) => Ok(HttpResponse::Ok().json(ApiResponse::success(summary))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/reconcile",
    tag = "tier",
    params(ReconcileQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Organization of the caller reconciled", body = OrganizationReconciliation),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Tier configuration is unusable")
    )
)]
pub async fn reconcile_organization(
    reconciliation_service: web::Data<ReconciliationService>,
    req: HttpRequest,
    query: web::Query<ReconcileQuery>,
) -> Result<HttpResponse> {
    let org_id = match tenant_id(&req, Access::Manager) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match reconciliation_service
        .reconcile_organization(org_id, query.dry_run.unwrap_or(false))
        .await
    {
        Ok(report) => Ok(HttpResponse::Ok().json(ApiResponse::success(report))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/reconcile", web::post().to(reconcile_organization))
        .service(
            web::scope("/admin")
                .route("/organizations", web::post().to(create_organization))
                .route("/reconcile", web::post().to(reconcile_all)),
        );
}
