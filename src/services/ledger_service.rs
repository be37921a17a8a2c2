use crate::entities::{
    PointTransactionKind, customer_entity as customers, notification_entity as notifications,
    point_transaction_entity as point_transactions, reward_entity as rewards,
};
use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    AdjustPointsRequest, CustomerResponse, PaginatedResponse, PaginationParams,
    PointTransactionResponse, PointsChangeResponse, RecordPurchaseRequest, RedeemRewardRequest,
};
use crate::services::customer_service::{find_customer, lock_customer};
use crate::services::organization_service::lock_organization;
use crate::services::tier_service::load_schedule;
use crate::tier::{Tier, TierSchedule, check_reward, points_for_purchase};
use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

/// One signed movement of a customer's balance.
#[derive(Debug, Clone)]
pub(crate) struct PointsChange {
    pub kind: PointTransactionKind,
    pub delta: i64,
    /// Set for purchases only; also bumps visits and total spent
    pub amount_cents: Option<i64>,
    pub reward_id: Option<Uuid>,
    pub related_customer_id: Option<Uuid>,
    pub description: Option<String>,
}

impl PointsChange {
    pub fn new(kind: PointTransactionKind, delta: i64) -> Self {
        Self {
            kind,
            delta,
            amount_cents: None,
            reward_id: None,
            related_customer_id: None,
            description: None,
        }
    }
}

pub(crate) struct AppliedChange {
    pub customer: customers::Model,
    pub transaction: point_transactions::Model,
    pub previous_tier: String,
}

impl AppliedChange {
    fn into_response(self, schedule: &TierSchedule) -> PointsChangeResponse {
        PointsChangeResponse {
            tier_changed: self.customer.tier != self.previous_tier,
            customer: CustomerResponse::new(self.customer, schedule),
            transaction: self.transaction.into(),
            previous_tier: self.previous_tier,
        }
    }
}

/// Whether moving from `before` to `after` points crosses into a higher tier.
pub(crate) fn is_upgrade(schedule: &TierSchedule, before: i64, after: i64) -> bool {
    schedule.resolve(after).threshold > schedule.resolve(before).threshold
}

fn upgrade_notification_metadata(old_tier: &str, new_tier: &Tier) -> serde_json::Value {
    json!({
        "old_tier": old_tier,
        "new_tier": new_tier.name,
        "new_tier_color": new_tier.color,
        "multiplier": new_tier.multiplier,
    })
}

/// Apply `change` to a customer row that the caller has locked.
///
/// Points and tier are written by the same UPDATE, the ledger row carries the
/// resulting balance and tier, and an upgrade notification is queued when the
/// customer enters a higher tier.
pub(crate) async fn apply_points_change(
    txn: &DatabaseTransaction,
    schedule: &TierSchedule,
    customer: customers::Model,
    change: PointsChange,
) -> AppResult<AppliedChange> {
    let new_points = customer
        .points
        .checked_add(change.delta)
        .ok_or_else(|| AppError::ValidationError("Points balance overflow".to_string()))?;
    if new_points < 0 {
        return Err(AppError::ValidationError(format!(
            "Insufficient points: balance is {}, change is {}",
            customer.points, change.delta
        )));
    }

    let now = Utc::now();
    let new_tier = schedule.resolve(new_points);
    let previous_tier = customer.tier.clone();
    let upgraded = is_upgrade(schedule, customer.points, new_points);

    let organization_id = customer.organization_id;
    let customer_id = customer.id;
    let total_spent = customer.total_spent;
    let visits = customer.visits;

    let mut row = customer.into_active_model();
    row.points = Set(new_points);
    row.tier = Set(new_tier.name.clone());
    if let Some(amount) = change.amount_cents {
        row.total_spent = Set(total_spent.saturating_add(amount));
        row.visits = Set(visits.saturating_add(1));
        row.last_visit = Set(Some(now));
    }
    row.updated_at = Set(Some(now));
    let customer = row.update(txn).await?;

    let transaction = point_transactions::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(organization_id),
        customer_id: Set(customer_id),
        kind: Set(change.kind),
        points: Set(change.delta),
        amount_cents: Set(change.amount_cents),
        balance_after: Set(new_points),
        tier_after: Set(new_tier.name.clone()),
        reward_id: Set(change.reward_id),
        related_customer_id: Set(change.related_customer_id),
        description: Set(change.description),
        created_at: Set(Some(now)),
    }
    .insert(txn)
    .await?;

    if upgraded {
        notifications::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            customer_id: Set(customer_id),
            category: Set("tier_upgrade".to_string()),
            title: Set(format!("Welcome to {}", new_tier.name)),
            message: Set(format!(
                "You reached the {} tier: purchases now earn {}x points",
                new_tier.name, new_tier.multiplier
            )),
            metadata: Set(upgrade_notification_metadata(&previous_tier, new_tier)),
            is_read: Set(false),
            created_at: Set(Some(now)),
        }
        .insert(txn)
        .await?;
        log::info!(
            "Customer {customer_id} upgraded from {previous_tier} to {}",
            new_tier.name
        );
    } else if previous_tier != new_tier.name {
        log::info!(
            "Customer {customer_id} moved from {previous_tier} to {}",
            new_tier.name
        );
    }

    Ok(AppliedChange {
        customer,
        transaction,
        previous_tier,
    })
}

#[derive(Clone)]
pub struct LedgerService {
    pool: DbPool,
    referral_bonus_points: i64,
}

impl LedgerService {
    pub fn new(pool: DbPool, referral_bonus_points: i64) -> Self {
        Self {
            pool,
            referral_bonus_points,
        }
    }

    /// Credit a purchase. Points are computed with the multiplier of the tier
    /// the customer holds before the purchase.
    pub async fn record_purchase(
        &self,
        organization_id: Uuid,
        customer_id: Uuid,
        req: RecordPurchaseRequest,
    ) -> AppResult<PointsChangeResponse> {
        if req.amount_cents <= 0 {
            return Err(AppError::ValidationError(
                "amount_cents must be greater than zero".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;
        let org = lock_organization(&txn, organization_id, LockType::Share).await?;
        let schedule = load_schedule(&txn, organization_id).await?;
        let customer = lock_customer(&txn, organization_id, customer_id).await?;
        if !customer.is_active {
            return Err(AppError::ValidationError("Customer is not active".to_string()));
        }

        let multiplier = schedule.resolve(customer.points).multiplier;
        let earned = points_for_purchase(req.amount_cents, org.points_per_currency_unit, multiplier)?;

        let mut change = PointsChange::new(PointTransactionKind::Purchase, earned);
        change.amount_cents = Some(req.amount_cents);
        change.description = req.description;

        let applied = apply_points_change(&txn, &schedule, customer, change).await?;
        txn.commit().await?;

        log::info!(
            "Purchase of {} cents credited {earned} points to customer {customer_id}",
            req.amount_cents
        );
        Ok(applied.into_response(&schedule))
    }

    /// Credit the referrer of `customer_id`, once per referred customer.
    pub async fn award_referral_bonus(
        &self,
        organization_id: Uuid,
        customer_id: Uuid,
    ) -> AppResult<PointsChangeResponse> {
        if self.referral_bonus_points <= 0 {
            return Err(AppError::ValidationError("Referral bonus is disabled".to_string()));
        }

        let txn = self.pool.begin().await?;
        lock_organization(&txn, organization_id, LockType::Share).await?;
        let schedule = load_schedule(&txn, organization_id).await?;

        let referred = find_customer(&txn, organization_id, customer_id).await?;
        let referrer_id = referred.referred_by.ok_or_else(|| {
            AppError::ValidationError("Customer was not referred by anyone".to_string())
        })?;
        let referrer = lock_customer(&txn, organization_id, referrer_id).await?;

        let already_awarded = point_transactions::Entity::find()
            .filter(point_transactions::Column::CustomerId.eq(referrer.id))
            .filter(point_transactions::Column::Kind.eq(PointTransactionKind::ReferralBonus))
            .filter(point_transactions::Column::RelatedCustomerId.eq(referred.id))
            .count(&txn)
            .await?;
        if already_awarded > 0 {
            return Err(AppError::ValidationError(
                "Referral bonus already awarded for this customer".to_string(),
            ));
        }

        let mut change = PointsChange::new(PointTransactionKind::ReferralBonus, self.referral_bonus_points);
        change.related_customer_id = Some(referred.id);
        change.description = Some(format!("Referral of {}", referred.name));

        let applied = apply_points_change(&txn, &schedule, referrer, change).await?;
        txn.commit().await?;
        Ok(applied.into_response(&schedule))
    }

    /// Manual signed correction by staff.
    pub async fn adjust_points(
        &self,
        organization_id: Uuid,
        customer_id: Uuid,
        req: AdjustPointsRequest,
    ) -> AppResult<PointsChangeResponse> {
        if req.points == 0 {
            return Err(AppError::ValidationError("Adjustment must not be zero".to_string()));
        }
        if req.description.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Adjustment needs a description".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;
        lock_organization(&txn, organization_id, LockType::Share).await?;
        let schedule = load_schedule(&txn, organization_id).await?;
        let customer = lock_customer(&txn, organization_id, customer_id).await?;

        let mut change = PointsChange::new(PointTransactionKind::Adjustment, req.points);
        change.description = Some(req.description.trim().to_string());

        let applied = apply_points_change(&txn, &schedule, customer, change).await?;
        txn.commit().await?;
        log::info!("Adjusted customer {customer_id} by {} points", req.points);
        Ok(applied.into_response(&schedule))
    }

    /// Spend points on a reward. Eligibility uses the tier recomputed from
    /// the locked balance, and stock is decremented in the same transaction.
    pub async fn redeem_reward(
        &self,
        organization_id: Uuid,
        customer_id: Uuid,
        req: RedeemRewardRequest,
    ) -> AppResult<PointsChangeResponse> {
        let txn = self.pool.begin().await?;
        let org = lock_organization(&txn, organization_id, LockType::Share).await?;
        let schedule = load_schedule(&txn, organization_id).await?;
        let customer = lock_customer(&txn, organization_id, customer_id).await?;

        let reward = rewards::Entity::find_by_id(req.reward_id)
            .filter(rewards::Column::OrganizationId.eq(organization_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Reward not found".to_string()))?;

        let terms = reward.terms(org.reward_threshold);
        check_reward(&schedule, customer.points, &terms, Utc::now())?;

        let reward_id = reward.id;
        let points_required = reward.points_required;
        let description = format!("Redeemed {}", reward.name);
        if let Some(stock) = reward.stock_quantity {
            let mut row = reward.into_active_model();
            row.stock_quantity = Set(Some(stock - 1));
            row.update(&txn).await?;
        }

        let mut change = PointsChange::new(PointTransactionKind::Redemption, -points_required);
        change.reward_id = Some(reward_id);
        change.description = Some(description);

        let applied = apply_points_change(&txn, &schedule, customer, change).await?;
        txn.commit().await?;
        log::info!("Customer {customer_id} redeemed reward {reward_id}");
        Ok(applied.into_response(&schedule))
    }

    /// Newest first.
    pub async fn list_transactions(
        &self,
        organization_id: Uuid,
        customer_id: Uuid,
        params: PaginationParams,
    ) -> AppResult<PaginatedResponse<PointTransactionResponse>> {
        find_customer(self.pool.as_ref(), organization_id, customer_id).await?;

        let query = point_transactions::Entity::find()
            .filter(point_transactions::Column::OrganizationId.eq(organization_id))
            .filter(point_transactions::Column::CustomerId.eq(customer_id));

        let total = query.clone().count(self.pool.as_ref()).await?;
        let items = query
            .order_by_desc(point_transactions::Column::CreatedAt)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(PointTransactionResponse::from)
            .collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use crate::entities::{loyalty_tier_entity as loyalty_tiers, organization_entity as organizations};
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn schedule() -> TierSchedule {
        TierSchedule::new(vec![
            Tier::new("Base", 0, 1.0),
            Tier::new("Silver", 100, 1.2),
            Tier::new("Gold", 500, 1.5),
        ])
        .unwrap()
    }

    fn organization(reward_threshold: i64) -> organizations::Model {
        organizations::Model {
            id: Uuid::new_v4(),
            slug: "bar-luca".to_string(),
            name: "Bar Luca".to_string(),
            primary_color: None,
            secondary_color: None,
            points_per_currency_unit: 1.0,
            reward_threshold,
            welcome_bonus: 0,
            created_at: None,
            updated_at: None,
        }
    }

    fn tier_rows(org: Uuid) -> Vec<loyalty_tiers::Model> {
        [("Base", 0, 1.0), ("Silver", 100, 1.2), ("Gold", 500, 1.5)]
            .into_iter()
            .map(|(name, threshold, multiplier)| loyalty_tiers::Model {
                id: Uuid::new_v4(),
                organization_id: org,
                name: name.to_string(),
                threshold,
                multiplier,
                color: None,
                benefits: serde_json::json!([]),
                created_at: None,
            })
            .collect()
    }

    fn customer(org: Uuid, points: i64, tier: &str) -> customers::Model {
        customers::Model {
            id: Uuid::new_v4(),
            organization_id: org,
            name: "Giulia".to_string(),
            email: None,
            phone: None,
            points,
            tier: tier.to_string(),
            total_spent: 0,
            visits: 0,
            last_visit: None,
            referral_code: "GIULIA01".to_string(),
            referred_by: None,
            auth_user_id: None,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn ledger_row(
        customer: &customers::Model,
        kind: PointTransactionKind,
        points: i64,
    ) -> point_transactions::Model {
        point_transactions::Model {
            id: Uuid::new_v4(),
            organization_id: customer.organization_id,
            customer_id: customer.id,
            kind,
            points,
            amount_cents: None,
            balance_after: customer.points,
            tier_after: customer.tier.clone(),
            reward_id: None,
            related_customer_id: None,
            description: None,
            created_at: None,
        }
    }

    fn service() -> LedgerService {
        LedgerService::new(
            Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection()),
            50,
        )
    }

    #[test]
    fn test_is_upgrade() {
        let schedule = schedule();
        assert!(is_upgrade(&schedule, 90, 100));
        assert!(is_upgrade(&schedule, 0, 800));
        assert!(!is_upgrade(&schedule, 100, 499));
        assert!(!is_upgrade(&schedule, 600, 50));
    }

    #[test]
    fn test_upgrade_notification_metadata() {
        let mut gold = Tier::new("Gold", 500, 1.5);
        gold.color = Some("#eab308".to_string());
        let metadata = upgrade_notification_metadata("Silver", &gold);
        assert_eq!(metadata["old_tier"], "Silver");
        assert_eq!(metadata["new_tier"], "Gold");
        assert_eq!(metadata["new_tier_color"], "#eab308");
        assert_eq!(metadata["multiplier"], 1.5);
    }

    #[tokio::test]
    async fn test_record_purchase_rejects_non_positive_amount() {
        let req = RecordPurchaseRequest {
            amount_cents: 0,
            description: None,
        };
        let err = service()
            .record_purchase(Uuid::new_v4(), Uuid::new_v4(), req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_adjust_points_rejects_zero_and_blank_description() {
        let zero = AdjustPointsRequest {
            points: 0,
            description: "noop".to_string(),
        };
        assert!(matches!(
            service().adjust_points(Uuid::new_v4(), Uuid::new_v4(), zero).await,
            Err(AppError::ValidationError(_))
        ));

        let blank = AdjustPointsRequest {
            points: 10,
            description: "   ".to_string(),
        };
        assert!(matches!(
            service().adjust_points(Uuid::new_v4(), Uuid::new_v4(), blank).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_purchase_crossing_threshold_upgrades_and_notifies() {
        let org = organization(100);
        let org_id = org.id;
        let before = customer(org_id, 90, "Base");
        let customer_id = before.id;
        let mut after = before.clone();
        after.points = 100;
        after.tier = "Silver".to_string();
        after.total_spent = 1000;
        after.visits = 1;

        let mut tx = ledger_row(&after, PointTransactionKind::Purchase, 10);
        tx.amount_cents = Some(1000);
        let notification = notifications::Model {
            id: Uuid::new_v4(),
            organization_id: org_id,
            customer_id,
            category: "tier_upgrade".to_string(),
            title: "Welcome to Silver".to_string(),
            message: String::new(),
            metadata: serde_json::json!({}),
            is_read: false,
            created_at: None,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![org]])
            .append_query_results([tier_rows(org_id)])
            .append_query_results([vec![before], vec![after]])
            .append_query_results([vec![tx]])
            .append_query_results([vec![notification]])
            .into_connection();
        let db = Arc::new(db);

        let req = RecordPurchaseRequest {
            amount_cents: 1000,
            description: None,
        };
        let response = LedgerService::new(db.clone(), 50)
            .record_purchase(org_id, customer_id, req)
            .await
            .unwrap();
        assert!(response.tier_changed);
        assert_eq!(response.previous_tier, "Base");
        assert_eq!(response.customer.tier, "Silver");
        assert_eq!(response.transaction.points, 10);

        let db = Arc::try_unwrap(db).ok().unwrap();
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("FOR SHARE"));
        assert!(log.contains("FOR UPDATE"));
        assert!(log.contains("customer_notifications"));
        assert!(log.contains("BigInt(Some(100))"));
        assert!(log.contains("String(Some(\"Silver\"))"));
    }

    #[tokio::test]
    async fn test_adjustment_below_zero_is_rejected_without_writing() {
        let org = organization(100);
        let org_id = org.id;
        let current = customer(org_id, 50, "Base");
        let customer_id = current.id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![org]])
            .append_query_results([tier_rows(org_id)])
            .append_query_results([vec![current]])
            .into_connection();
        let db = Arc::new(db);

        let req = AdjustPointsRequest {
            points: -100,
            description: "Refund".to_string(),
        };
        let err = LedgerService::new(db.clone(), 50)
            .adjust_points(org_id, customer_id, req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let db = Arc::try_unwrap(db).ok().unwrap();
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("ROLLBACK"));
        assert!(!log.contains("UPDATE \\\"customers\\\""));
        assert!(!log.contains("INSERT"));
    }

    #[tokio::test]
    async fn test_referral_bonus_is_awarded_once() {
        let org = organization(100);
        let org_id = org.id;
        let referrer = customer(org_id, 20, "Base");
        let mut referred = customer(org_id, 0, "Base");
        referred.referred_by = Some(referrer.id);
        let referred_id = referred.id;

        let existing = BTreeMap::from([("num_items", Value::BigInt(Some(1)))]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![org]])
            .append_query_results([tier_rows(org_id)])
            .append_query_results([vec![referred], vec![referrer]])
            .append_query_results([vec![existing]])
            .into_connection();

        let err = LedgerService::new(Arc::new(db), 50)
            .award_referral_bonus(org_id, referred_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_redemption_decrements_stock_and_debits_points() {
        let org = organization(100);
        let org_id = org.id;
        let before = customer(org_id, 300, "Silver");
        let customer_id = before.id;
        let mut after = before.clone();
        after.points = 180;

        let reward = rewards::Model {
            id: Uuid::new_v4(),
            organization_id: org_id,
            name: "Dinner".to_string(),
            description: None,
            points_required: 120,
            required_tier: Some("Silver".to_string()),
            stock_quantity: Some(3),
            valid_from: None,
            valid_until: None,
            is_active: true,
            created_at: None,
        };
        let reward_id = reward.id;
        let mut restocked = reward.clone();
        restocked.stock_quantity = Some(2);

        let mut tx = ledger_row(&after, PointTransactionKind::Redemption, -120);
        tx.reward_id = Some(reward_id);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![org]])
            .append_query_results([tier_rows(org_id)])
            .append_query_results([vec![before]])
            .append_query_results([vec![reward], vec![restocked]])
            .append_query_results([vec![after]])
            .append_query_results([vec![tx]])
            .into_connection();
        let db = Arc::new(db);

        let response = LedgerService::new(db.clone(), 50)
            .redeem_reward(org_id, customer_id, RedeemRewardRequest { reward_id })
            .await
            .unwrap();
        assert!(!response.tier_changed);
        assert_eq!(response.customer.points, 180);
        assert_eq!(response.transaction.points, -120);
        assert_eq!(response.transaction.reward_id, Some(reward_id));

        let db = Arc::try_unwrap(db).ok().unwrap();
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("Int(Some(2))"));
        assert!(log.contains("BigInt(Some(180))"));
        assert!(!log.contains("customer_notifications"));
    }
}
