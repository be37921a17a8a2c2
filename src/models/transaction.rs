use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::CustomerResponse;
use crate::entities::{PointTransactionKind, point_transaction_entity as point_transactions};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordPurchaseRequest {
    #[schema(example = 2550)]
    pub amount_cents: i64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdjustPointsRequest {
    /// Signed delta
    #[schema(example = -20)]
    pub points: i64,
    #[schema(example = "Correction of duplicated sale")]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RedeemRewardRequest {
    pub reward_id: Uuid,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PointTransactionResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub kind: PointTransactionKind,
    pub points: i64,
    pub amount_cents: Option<i64>,
    pub balance_after: i64,
    pub tier_after: String,
    pub reward_id: Option<Uuid>,
    pub related_customer_id: Option<Uuid>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<point_transactions::Model> for PointTransactionResponse {
    fn from(m: point_transactions::Model) -> Self {
        Self {
            id: m.id,
            customer_id: m.customer_id,
            kind: m.kind,
            points: m.points,
            amount_cents: m.amount_cents,
            balance_after: m.balance_after,
            tier_after: m.tier_after,
            reward_id: m.reward_id,
            related_customer_id: m.related_customer_id,
            description: m.description,
            created_at: m.created_at,
        }
    }
}

/// Result of any operation that changes a customer's points.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PointsChangeResponse {
    pub customer: CustomerResponse,
    pub transaction: PointTransactionResponse,
    pub previous_tier: String,
    pub tier_changed: bool,
}
