use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::organization_entity as organizations;
use crate::tier::Tier;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOrganizationRequest {
    #[schema(example = "pizzeria-da-mario")]
    pub slug: String,
    #[schema(example = "Pizzeria da Mario")]
    pub name: String,
    #[schema(example = "#ea580c")]
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    #[schema(example = 1.0)]
    pub points_per_currency_unit: Option<f64>,
    #[schema(example = 100)]
    pub reward_threshold: Option<i64>,
    #[schema(example = 50)]
    pub welcome_bonus: Option<i64>,
    /// Initial tier set; must not be empty
    pub tiers: Vec<Tier>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrganizationSettingsRequest {
    pub name: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub points_per_currency_unit: Option<f64>,
    pub reward_threshold: Option<i64>,
    pub welcome_bonus: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrganizationResponse {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub points_per_currency_unit: f64,
    pub reward_threshold: i64,
    pub welcome_bonus: i64,
    /// Ascending by threshold
    pub tiers: Vec<Tier>,
    pub created_at: Option<DateTime<Utc>>,
}

impl OrganizationResponse {
    pub fn new(org: organizations::Model, tiers: Vec<Tier>) -> Self {
        Self {
            id: org.id,
            slug: org.slug,
            name: org.name,
            primary_color: org.primary_color,
            secondary_color: org.secondary_color,
            points_per_currency_unit: org.points_per_currency_unit,
            reward_threshold: org.reward_threshold,
            welcome_bonus: org.welcome_bonus,
            tiers,
            created_at: org.created_at,
        }
    }
}
