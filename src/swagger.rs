use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::PointTransactionKind;
use crate::handlers;
use crate::models::*;
use crate::tier::{Tier, TierCorrection};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::admin::create_organization,
        handlers::admin::reconcile_all,
        handlers::admin::reconcile_organization,
        handlers::organization::get_organization,
        handlers::organization::update_settings,
        handlers::tier::list_tiers,
        handlers::tier::replace_tiers,
        handlers::tier::resolve_tier,
        handlers::customer::create_customer,
        handlers::customer::list_customers,
        handlers::customer::top_customers,
        handlers::customer::get_customer,
        handlers::customer::get_by_referral_code,
        handlers::customer::list_transactions,
        handlers::customer::available_rewards,
        handlers::customer::record_purchase,
        handlers::customer::award_referral_bonus,
        handlers::customer::adjust_points,
        handlers::customer::redeem_reward,
        handlers::reward::create_reward,
        handlers::reward::list_rewards,
    ),
    components(
        schemas(
            Tier,
            TierCorrection,
            PointTransactionKind,
            ApiError,
            CreateOrganizationRequest,
            UpdateOrganizationSettingsRequest,
            OrganizationResponse,
            ReplaceTiersRequest,
            ReplaceTiersResponse,
            ResolvedTierResponse,
            CreateCustomerRequest,
            CustomerResponse,
            TopCustomersBy,
            RecordPurchaseRequest,
            AdjustPointsRequest,
            RedeemRewardRequest,
            PointTransactionResponse,
            PointsChangeResponse,
            CreateRewardRequest,
            RewardResponse,
            OrganizationReconciliation,
            FailedOrganization,
            ReconciliationSummary,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness probe"),
        (name = "admin", description = "Cross-tenant operations, service role only"),
        (name = "organization", description = "Tenant settings"),
        (name = "tier", description = "Loyalty tiers and reconciliation"),
        (name = "customer", description = "Customer enrollment and lookup"),
        (name = "points", description = "Points ledger operations"),
        (name = "reward", description = "Reward catalog"),
    ),
    info(
        title = "Omnily Loyalty API",
        version = "1.0.0",
        description = "Multi-tenant loyalty points and tier service"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
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
