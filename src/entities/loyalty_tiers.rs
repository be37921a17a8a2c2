use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::tier::Tier;

/// One tier row. (organization_id, threshold) and (organization_id, name)
/// are unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "loyalty_tiers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub threshold: i64,
    pub multiplier: f64,
    pub color: Option<String>,
    /// JSON array of benefit descriptions
    pub benefits: Json,
    pub created_at: Option<DateTime<Utc>>,
}

impl Model {
    /// Benefits stored as anything other than an array of strings are dropped.
    pub fn benefit_list(&self) -> Vec<String> {
        self.benefits
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl From<Model> for Tier {
    fn from(m: Model) -> Self {
        let benefits = m.benefit_list();
        Tier {
            name: m.name,
            threshold: m.threshold,
            multiplier: m.multiplier,
            color: m.color,
            benefits,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
