use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::entities::customer_entity as customers;
use crate::tier::TierSchedule;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCustomerRequest {
    #[schema(example = "Giulia Rossi")]
    pub name: String,
    #[schema(example = "giulia@example.it")]
    pub email: Option<String>,
    #[schema(example = "+393331234567")]
    pub phone: Option<String>,
    /// Referral code of an existing customer of the same organization
    #[schema(example = "K7MQ2XPA")]
    pub referral_code: Option<String>,
    pub auth_user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub points: i64,
    /// Tier label stored on the customer row
    pub tier: String,
    /// Tier computed from `points` right now
    pub resolved_tier: String,
    pub tier_in_sync: bool,
    pub multiplier: f64,
    pub total_spent: i64,
    pub visits: i32,
    pub last_visit: Option<DateTime<Utc>>,
    pub referral_code: String,
    pub referred_by: Option<Uuid>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl CustomerResponse {
    pub fn new(customer: customers::Model, schedule: &TierSchedule) -> Self {
        let resolved = schedule.resolve(customer.points);
        Self {
            tier_in_sync: customer.tier == resolved.name,
            resolved_tier: resolved.name.clone(),
            multiplier: resolved.multiplier,
            id: customer.id,
            organization_id: customer.organization_id,
            name: customer.name,
            email: customer.email,
            phone: customer.phone,
            points: customer.points,
            tier: customer.tier,
            total_spent: customer.total_spent,
            visits: customer.visits,
            last_visit: customer.last_visit,
            referral_code: customer.referral_code,
            referred_by: customer.referred_by,
            is_active: customer.is_active,
            created_at: customer.created_at,
        }
    }
}

/// Optional filters for the customer listing.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CustomerFilter {
    /// Case-insensitive match on name, email or phone
    pub q: Option<String>,
    /// Customers whose balance currently resolves to this tier
    pub tier: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TopCustomersBy {
    #[default]
    Points,
    Spending,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TopCustomersParams {
    /// Ranking key, `points` (default) or `spending`
    pub by: Option<TopCustomersBy>,
    /// Number of customers (1-100, default 10)
    pub limit: Option<u64>,
}

impl TopCustomersParams {
    pub fn get_by(&self) -> TopCustomersBy {
        self.by.unwrap_or_default()
    }

    pub fn get_limit(&self) -> u64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }
}
