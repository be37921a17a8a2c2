use crate::entities::organization_entity as organizations;
use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{CreateOrganizationRequest, OrganizationResponse, UpdateOrganizationSettingsRequest};
use crate::services::tier_service::{insert_tiers, load_schedule};
use crate::tier::TierSchedule;
use crate::utils::{validate_color, validate_slug};
use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction,
    EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

pub(crate) async fn find_organization<C>(db: &C, organization_id: Uuid) -> AppResult<organizations::Model>
where
    C: ConnectionTrait,
{
    organizations::Entity::find_by_id(organization_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))
}

/// Row lock on the tenant. Tier replacement takes `Update`, points
/// mutations take `Share`.
pub(crate) async fn lock_organization(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    lock: LockType,
) -> AppResult<organizations::Model> {
    organizations::Entity::find_by_id(organization_id)
        .lock(lock)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))
}

fn validate_settings(
    points_per_currency_unit: Option<f64>,
    reward_threshold: Option<i64>,
    welcome_bonus: Option<i64>,
    colors: [Option<&str>; 2],
) -> AppResult<()> {
    if let Some(rate) = points_per_currency_unit
        && (!rate.is_finite() || rate <= 0.0)
    {
        return Err(AppError::ValidationError(
            "points_per_currency_unit must be a positive number".to_string(),
        ));
    }
    if matches!(reward_threshold, Some(v) if v < 0) {
        return Err(AppError::ValidationError(
            "reward_threshold must not be negative".to_string(),
        ));
    }
    if matches!(welcome_bonus, Some(v) if v < 0) {
        return Err(AppError::ValidationError(
            "welcome_bonus must not be negative".to_string(),
        ));
    }
    for color in colors.into_iter().flatten() {
        validate_color(color)?;
    }
    Ok(())
}

#[derive(Clone)]
pub struct OrganizationService {
    pool: DbPool,
}

impl OrganizationService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a tenant together with its initial tier set.
    pub async fn create_organization(
        &self,
        req: CreateOrganizationRequest,
    ) -> AppResult<OrganizationResponse> {
        let slug = req.slug.trim().to_lowercase();
        validate_slug(&slug)?;
        if req.name.trim().is_empty() {
            return Err(AppError::ValidationError("Organization name is required".to_string()));
        }
        validate_settings(
            req.points_per_currency_unit,
            req.reward_threshold,
            req.welcome_bonus,
            [req.primary_color.as_deref(), req.secondary_color.as_deref()],
        )?;
        let schedule = TierSchedule::new(req.tiers)?;

        let taken = organizations::Entity::find()
            .filter(organizations::Column::Slug.eq(slug.as_str()))
            .count(self.pool.as_ref())
            .await?;
        if taken > 0 {
            return Err(AppError::ValidationError(format!("Slug '{slug}' is already taken")));
        }

        let now = Utc::now();
        let txn = self.pool.begin().await?;
        let org = organizations::ActiveModel {
            id: Set(Uuid::new_v4()),
            slug: Set(slug),
            name: Set(req.name.trim().to_string()),
            primary_color: Set(req.primary_color),
            secondary_color: Set(req.secondary_color),
            points_per_currency_unit: Set(req.points_per_currency_unit.unwrap_or(1.0)),
            reward_threshold: Set(req.reward_threshold.unwrap_or(100)),
            welcome_bonus: Set(req.welcome_bonus.unwrap_or(0)),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        }
        .insert(&txn)
        .await?;
        insert_tiers(&txn, org.id, &schedule).await?;
        txn.commit().await?;

        log::info!(
            "Created organization {} ({}) with {} tiers",
            org.slug,
            org.id,
            schedule.tiers().len()
        );
        Ok(OrganizationResponse::new(org, schedule.into_tiers()))
    }

    pub async fn get_organization(&self, organization_id: Uuid) -> AppResult<OrganizationResponse> {
        let org = find_organization(self.pool.as_ref(), organization_id).await?;
        let schedule = load_schedule(self.pool.as_ref(), organization_id).await?;
        Ok(OrganizationResponse::new(org, schedule.into_tiers()))
    }

    pub async fn get_by_slug(&self, slug: &str) -> AppResult<organizations::Model> {
        organizations::Entity::find()
            .filter(organizations::Column::Slug.eq(slug.trim().to_lowercase()))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Organization '{slug}' not found")))
    }

    /// Partial update; fields left out of the request keep their value.
    pub async fn update_settings(
        &self,
        organization_id: Uuid,
        req: UpdateOrganizationSettingsRequest,
    ) -> AppResult<OrganizationResponse> {
        validate_settings(
            req.points_per_currency_unit,
            req.reward_threshold,
            req.welcome_bonus,
            [req.primary_color.as_deref(), req.secondary_color.as_deref()],
        )?;

        let mut org = find_organization(self.pool.as_ref(), organization_id)
            .await?
            .into_active_model();

        if let Some(name) = req.name {
            if name.trim().is_empty() {
                return Err(AppError::ValidationError("Organization name is required".to_string()));
            }
            org.name = Set(name.trim().to_string());
        }
        if let Some(color) = req.primary_color {
            org.primary_color = Set(Some(color));
        }
        if let Some(color) = req.secondary_color {
            org.secondary_color = Set(Some(color));
        }
        if let Some(rate) = req.points_per_currency_unit {
            org.points_per_currency_unit = Set(rate);
        }
        if let Some(threshold) = req.reward_threshold {
            org.reward_threshold = Set(threshold);
        }
        if let Some(bonus) = req.welcome_bonus {
            org.welcome_bonus = Set(bonus);
        }
        org.updated_at = Set(Some(Utc::now()));

        let org = org.update(self.pool.as_ref()).await?;
        let schedule = load_schedule(self.pool.as_ref(), organization_id).await?;
        log::info!("Updated settings of organization {}", org.slug);
        Ok(OrganizationResponse::new(org, schedule.into_tiers()))
    }
}
