pub mod admin;
pub mod customer;
pub mod health;
pub mod organization;
pub mod reward;
pub mod tier;

pub use admin::admin_config;
pub use customer::customer_config;
pub use health::health_config;
pub use organization::organization_config;
pub use reward::reward_config;
pub use tier::tier_config;

use crate::error::{AppError, AppResult};
use crate::middlewares::current_claims;
use actix_web::HttpRequest;
use uuid::Uuid;

/// Least privilege a tenant route needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    /// Any token bound to the organization
    Member,
    /// Point-of-sale roles, see `STAFF_ROLES`
    Staff,
    /// Configuration and manual corrections, see `MANAGER_ROLES`
    Manager,
}

/// Organization the caller's token is bound to, once its role satisfies
/// `access`. Every tenant-scoped query takes its organization id from here,
/// never from the request body.
pub(crate) fn tenant_id(req: &HttpRequest, access: Access) -> AppResult<Uuid> {
    let claims = current_claims(req)
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))?;
    let allowed = match access {
        Access::Member => true,
        Access::Staff => claims.is_staff(),
        Access::Manager => claims.is_manager(),
    };
    if !allowed {
        return Err(AppError::Forbidden);
    }
    claims.organization_id.ok_or(AppError::Forbidden)
}

pub(crate) fn require_service_role(req: &HttpRequest) -> AppResult<()> {
    match current_claims(req) {
        Some(claims) if claims.is_service_role() => Ok(()),
        Some(_) => Err(AppError::Forbidden),
        None => Err(AppError::AuthError("Missing access token".to_string())),
    }
}
