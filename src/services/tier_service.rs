use crate::entities::{loyalty_tier_entity as loyalty_tiers, reward_entity as rewards};
use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{ReplaceTiersResponse, ResolvedTierResponse};
use crate::services::organization_service::lock_organization;
use crate::services::reconciliation_service::reconcile_customers;
use crate::tier::{Tier, TierSchedule};
use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Load and validate the tier set of an organization.
///
/// An organization without tiers is a configuration error; there is no
/// default tier to fall back to.
pub async fn load_schedule<C>(db: &C, organization_id: Uuid) -> AppResult<TierSchedule>
where
    C: ConnectionTrait,
{
    let rows = loyalty_tiers::Entity::find()
        .filter(loyalty_tiers::Column::OrganizationId.eq(organization_id))
        .order_by_asc(loyalty_tiers::Column::Threshold)
        .all(db)
        .await?;

    TierSchedule::new(rows.into_iter().map(Tier::from).collect()).map_err(|e| {
        log::error!("Organization {organization_id} has an unusable tier configuration: {e}");
        AppError::from(e)
    })
}

pub(crate) async fn insert_tiers<C>(
    db: &C,
    organization_id: Uuid,
    schedule: &TierSchedule,
) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let rows = schedule.tiers().iter().map(|tier| loyalty_tiers::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(organization_id),
        name: Set(tier.name.trim().to_string()),
        threshold: Set(tier.threshold),
        multiplier: Set(tier.multiplier),
        color: Set(tier.color.clone()),
        benefits: Set(serde_json::Value::from(tier.benefits.clone())),
        created_at: Set(Some(now)),
    });
    loyalty_tiers::Entity::insert_many(rows).exec(db).await?;
    Ok(())
}

/// `required_tier` names of the organization's rewards that `schedule` no
/// longer defines.
async fn dangling_reward_tiers(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    schedule: &TierSchedule,
) -> AppResult<Vec<String>> {
    let gated = rewards::Entity::find()
        .filter(rewards::Column::OrganizationId.eq(organization_id))
        .filter(rewards::Column::RequiredTier.is_not_null())
        .all(txn)
        .await?;

    let missing: BTreeSet<String> = gated
        .into_iter()
        .filter_map(|r| r.required_tier)
        .filter(|name| schedule.find(name).is_none())
        .collect();
    Ok(missing.into_iter().collect())
}

#[derive(Clone)]
pub struct TierService {
    pool: DbPool,
}

impl TierService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Stored tiers, ascending by threshold, without validation.
    pub async fn list_tiers(&self, organization_id: Uuid) -> AppResult<Vec<Tier>> {
        let rows = loyalty_tiers::Entity::find()
            .filter(loyalty_tiers::Column::OrganizationId.eq(organization_id))
            .order_by_asc(loyalty_tiers::Column::Threshold)
            .all(self.pool.as_ref())
            .await?;
        Ok(rows.into_iter().map(Tier::from).collect())
    }

    /// Replace the whole tier set and re-resolve every customer of the
    /// organization in the same transaction.
    ///
    /// The organization row is locked for update; points mutations take a
    /// shared lock on it, so no customer can be written with the old tiers
    /// after this commits.
    pub async fn replace_tiers(
        &self,
        organization_id: Uuid,
        tiers: Vec<Tier>,
    ) -> AppResult<ReplaceTiersResponse> {
        let schedule = TierSchedule::new(tiers)?;

        let txn = self.pool.begin().await?;
        lock_organization(&txn, organization_id, LockType::Update).await?;

        let missing = dangling_reward_tiers(&txn, organization_id, &schedule).await?;
        if !missing.is_empty() {
            return Err(AppError::ValidationError(format!(
                "Rewards still require tiers missing from the new set: {}",
                missing.join(", ")
            )));
        }

        loyalty_tiers::Entity::delete_many()
            .filter(loyalty_tiers::Column::OrganizationId.eq(organization_id))
            .exec(&txn)
            .await?;
        insert_tiers(&txn, organization_id, &schedule).await?;

        let reconciliation = reconcile_customers(&txn, organization_id, &schedule, false).await?;
        txn.commit().await?;

        log::info!(
            "Replaced tiers of organization {organization_id} ({} tiers), {} customers re-tiered",
            schedule.tiers().len(),
            reconciliation.corrected
        );

        Ok(ReplaceTiersResponse {
            tiers: schedule.into_tiers(),
            reconciliation,
        })
    }

    pub async fn resolve_for_points(
        &self,
        organization_id: Uuid,
        points: i64,
    ) -> AppResult<ResolvedTierResponse> {
        let schedule = load_schedule(self.pool.as_ref(), organization_id).await?;
        Ok(describe_resolution(&schedule, points))
    }
}

pub(crate) fn describe_resolution(schedule: &TierSchedule, points: i64) -> ResolvedTierResponse {
    let tier = schedule.resolve(points).clone();
    let rank = schedule.rank_of(&tier.name).unwrap_or(0);
    let next_tier = schedule.next_tier(points).cloned();
    let points_to_next_tier = next_tier.as_ref().map(|t| t.threshold - points);
    ResolvedTierResponse {
        points,
        tier,
        rank,
        next_tier,
        points_to_next_tier,
    }
}
