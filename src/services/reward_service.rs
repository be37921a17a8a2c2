use crate::entities::reward_entity as rewards;
use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{CreateRewardRequest, RewardResponse};
use crate::services::customer_service::find_customer;
use crate::services::organization_service::find_organization;
use crate::services::tier_service::load_schedule;
use crate::tier::check_reward;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct RewardService {
    pool: DbPool,
}

impl RewardService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create_reward(
        &self,
        organization_id: Uuid,
        req: CreateRewardRequest,
    ) -> AppResult<RewardResponse> {
        if req.name.trim().is_empty() {
            return Err(AppError::ValidationError("Reward name is required".to_string()));
        }
        if req.points_required < 0 {
            return Err(AppError::ValidationError(
                "points_required must not be negative".to_string(),
            ));
        }
        if matches!(req.stock_quantity, Some(stock) if stock < 0) {
            return Err(AppError::ValidationError(
                "stock_quantity must not be negative".to_string(),
            ));
        }
        if let (Some(from), Some(until)) = (req.valid_from, req.valid_until)
            && from > until
        {
            return Err(AppError::ValidationError(
                "valid_from must not be after valid_until".to_string(),
            ));
        }

        // store the canonical tier name so later lookups do not depend on case
        let required_tier = match req.required_tier.as_deref().filter(|t| !t.trim().is_empty()) {
            Some(name) => {
                let schedule = load_schedule(self.pool.as_ref(), organization_id).await?;
                let tier = schedule.find(name).ok_or_else(|| {
                    AppError::ValidationError(format!("Unknown tier '{name}'"))
                })?;
                Some(tier.name.clone())
            }
            None => None,
        };

        let reward = rewards::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            name: Set(req.name.trim().to_string()),
            description: Set(req.description),
            points_required: Set(req.points_required),
            required_tier: Set(required_tier),
            stock_quantity: Set(req.stock_quantity),
            valid_from: Set(req.valid_from),
            valid_until: Set(req.valid_until),
            is_active: Set(true),
            created_at: Set(Some(Utc::now())),
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("Created reward {} for organization {organization_id}", reward.id);
        Ok(reward.into())
    }

    pub async fn list_rewards(&self, organization_id: Uuid) -> AppResult<Vec<RewardResponse>> {
        let rows = rewards::Entity::find()
            .filter(rewards::Column::OrganizationId.eq(organization_id))
            .order_by_asc(rewards::Column::PointsRequired)
            .all(self.pool.as_ref())
            .await?;
        Ok(rows.into_iter().map(RewardResponse::from).collect())
    }

    /// Rewards the customer could redeem right now. Nothing is available
    /// while the balance is below the organization's `reward_threshold`.
    pub async fn available_for_customer(
        &self,
        organization_id: Uuid,
        customer_id: Uuid,
    ) -> AppResult<Vec<RewardResponse>> {
        let org = find_organization(self.pool.as_ref(), organization_id).await?;
        let customer = find_customer(self.pool.as_ref(), organization_id, customer_id).await?;
        let schedule = load_schedule(self.pool.as_ref(), organization_id).await?;
        let now = Utc::now();

        let rows = rewards::Entity::find()
            .filter(rewards::Column::OrganizationId.eq(organization_id))
            .filter(rewards::Column::IsActive.eq(true))
            .order_by_asc(rewards::Column::PointsRequired)
            .all(self.pool.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .filter(|r| {
                check_reward(&schedule, customer.points, &r.terms(org.reward_threshold), now).is_ok()
            })
            .map(RewardResponse::from)
            .collect())
    }
}
