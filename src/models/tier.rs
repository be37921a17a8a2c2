use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::OrganizationReconciliation;
use crate::tier::Tier;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReplaceTiersRequest {
    pub tiers: Vec<Tier>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReplaceTiersResponse {
    /// Stored tier set, ascending by threshold
    pub tiers: Vec<Tier>,
    /// Customers re-resolved against the new tier set
    pub reconciliation: OrganizationReconciliation,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResolveTierQuery {
    pub points: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResolvedTierResponse {
    pub points: i64,
    pub tier: Tier,
    /// 0 for the base tier
    pub rank: usize,
    pub next_tier: Option<Tier>,
    pub points_to_next_tier: Option<i64>,
}
