use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Tenant record. `slug` is globally unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub slug: String,
    pub name: String,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    /// Points earned per whole currency unit spent
    pub points_per_currency_unit: f64,
    /// Points needed before the first reward can be redeemed
    pub reward_threshold: i64,
    /// Points credited when a customer is created
    pub welcome_bonus: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
