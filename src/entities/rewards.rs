use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::tier::RewardTerms;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rewards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub points_required: i64,
    /// Minimum tier name, matched case-insensitively
    pub required_tier: Option<String>,
    /// NULL = unlimited
    pub stock_quantity: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl Model {
    /// Redemption terms, with the owning organization's `reward_threshold`.
    pub fn terms(&self, reward_threshold: i64) -> RewardTerms {
        RewardTerms {
            points_required: self.points_required,
            min_balance: reward_threshold,
            required_tier: self.required_tier.clone(),
            stock_quantity: self.stock_quantity,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            is_active: self.is_active,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
