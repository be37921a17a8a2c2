use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::reward_entity as rewards;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRewardRequest {
    #[schema(example = "Free dessert")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 150)]
    pub points_required: i64,
    #[schema(example = "Silver")]
    pub required_tier: Option<String>,
    pub stock_quantity: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RewardResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub points_required: i64,
    pub required_tier: Option<String>,
    pub stock_quantity: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl From<rewards::Model> for RewardResponse {
    fn from(m: rewards::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            points_required: m.points_required,
            required_tier: m.required_tier,
            stock_quantity: m.stock_quantity,
            valid_from: m.valid_from,
            valid_until: m.valid_until,
            is_active: m.is_active,
        }
    }
}
