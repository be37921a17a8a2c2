use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "point_transaction_kind"
)]
#[serde(rename_all = "snake_case")]
pub enum PointTransactionKind {
    #[sea_orm(string_value = "welcome_bonus")]
    WelcomeBonus,
    #[sea_orm(string_value = "purchase")]
    Purchase,
    #[sea_orm(string_value = "referral_bonus")]
    ReferralBonus,
    #[sea_orm(string_value = "redemption")]
    Redemption,
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
}

impl std::fmt::Display for PointTransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointTransactionKind::WelcomeBonus => write!(f, "welcome_bonus"),
            PointTransactionKind::Purchase => write!(f, "purchase"),
            PointTransactionKind::ReferralBonus => write!(f, "referral_bonus"),
            PointTransactionKind::Redemption => write!(f, "redemption"),
            PointTransactionKind::Adjustment => write!(f, "adjustment"),
        }
    }
}

/// Append-only points ledger.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "point_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub customer_id: Uuid,
    pub kind: PointTransactionKind,
    /// Signed delta applied to the balance
    pub points: i64,
    pub amount_cents: Option<i64>,
    pub balance_after: i64,
    pub tier_after: String,
    pub reward_id: Option<Uuid>,
    /// Referred customer, for referral bonuses
    pub related_customer_id: Option<Uuid>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
