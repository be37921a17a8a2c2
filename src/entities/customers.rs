use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::tier::TierSnapshot;

/// Customer of one organization.
///
/// `tier` is denormalized: it caches the resolver output for `points` and is
/// rewritten in the same transaction as every `points` change.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub points: i64,
    pub tier: String,
    /// Cents
    pub total_spent: i64,
    pub visits: i32,
    pub last_visit: Option<DateTime<Utc>>,
    pub referral_code: String,
    pub referred_by: Option<Uuid>,
    pub auth_user_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn snapshot(&self) -> TierSnapshot {
        TierSnapshot {
            customer_id: self.id,
            points: self.points,
            stored_tier: self.tier.clone(),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
