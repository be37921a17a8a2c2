use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role carried by operator tokens that may act across tenants.
pub const SERVICE_ROLE: &str = "service_role";

/// Roles allowed to operate the point-of-sale flows of their organization.
pub const STAFF_ROLES: &[&str] = &["owner", "org_admin", "admin", "manager", "cashier", "staff"];

/// Roles allowed to change organization configuration and balances by hand.
pub const MANAGER_ROLES: &[&str] = &["owner", "org_admin", "admin", "manager"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // identity-provider user id
    /// Tenant the caller acts for; absent on cross-tenant operator tokens
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default = "default_role")]
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

fn default_role() -> String {
    "authenticated".to_string()
}

impl Claims {
    pub fn is_service_role(&self) -> bool {
        self.role == SERVICE_ROLE
    }

    pub fn is_staff(&self) -> bool {
        self.is_service_role() || STAFF_ROLES.contains(&self.role.as_str())
    }

    pub fn is_manager(&self) -> bool {
        self.is_service_role() || MANAGER_ROLES.contains(&self.role.as_str())
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: i64,
}

impl JwtService {
    pub fn new(secret: &str, access_expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in: access_expires_in,
        }
    }

    pub fn generate_access_token(
        &self,
        subject: &str,
        organization_id: Option<Uuid>,
        role: &str,
    ) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_token_expires_in);

        let claims = Claims {
            sub: subject.to_string(),
            organization_id,
            role: role.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AppError::JwtError)
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        // identity-provider tokens carry an audience we do not pin
        validation.validate_aud = false;
        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)?;

        if claims.organization_id.is_none() && !claims.is_service_role() {
            return Err(AppError::AuthError(
                "Token is not bound to an organization".to_string(),
            ));
        }

        Ok(claims)
    }
}
