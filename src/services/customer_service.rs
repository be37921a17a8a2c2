use crate::entities::{
    PointTransactionKind, customer_entity as customers,
    point_transaction_entity as point_transactions,
};
use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateCustomerRequest, CustomerFilter, CustomerResponse, PaginatedResponse, PaginationParams,
    TopCustomersBy, TopCustomersParams,
};
use crate::services::organization_service::lock_organization;
use crate::services::tier_service::load_schedule;
use crate::tier::TierSchedule;
use crate::utils::{generate_unique_referral_code, normalize_phone, validate_email};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait,
};
use uuid::Uuid;

pub(crate) async fn find_customer<C>(
    db: &C,
    organization_id: Uuid,
    customer_id: Uuid,
) -> AppResult<customers::Model>
where
    C: ConnectionTrait,
{
    customers::Entity::find_by_id(customer_id)
        .filter(customers::Column::OrganizationId.eq(organization_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))
}

/// `SELECT ... FOR UPDATE` on the customer; every points change goes through
/// this so concurrent writers serialize on the row.
pub(crate) async fn lock_customer(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    customer_id: Uuid,
) -> AppResult<customers::Model> {
    customers::Entity::find_by_id(customer_id)
        .filter(customers::Column::OrganizationId.eq(organization_id))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))
}

/// Lowercased `%term%` pattern with LIKE wildcards escaped.
fn search_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.trim().to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn apply_filter(
    mut query: Select<customers::Entity>,
    filter: &CustomerFilter,
    schedule: &TierSchedule,
) -> AppResult<Select<customers::Entity>> {
    if let Some(tier) = filter.tier.as_deref().filter(|t| !t.trim().is_empty()) {
        let (lower, upper) = schedule
            .bounds_of(tier)
            .ok_or_else(|| AppError::ValidationError(format!("Unknown tier '{tier}'")))?;
        if let Some(lower) = lower {
            query = query.filter(customers::Column::Points.gte(lower));
        }
        if let Some(upper) = upper {
            query = query.filter(customers::Column::Points.lt(upper));
        }
    }

    if let Some(term) = filter.q.as_deref().filter(|q| !q.trim().is_empty()) {
        let pattern = search_pattern(term);
        let mut any = Condition::any();
        for column in [
            customers::Column::Name,
            customers::Column::Email,
            customers::Column::Phone,
        ] {
            any = any.add(Expr::expr(Func::lower(Expr::col(column))).like(pattern.clone()));
        }
        query = query.filter(any);
    }

    Ok(query)
}

async fn find_by_referral_code<C>(
    db: &C,
    organization_id: Uuid,
    code: &str,
) -> AppResult<Option<customers::Model>>
where
    C: ConnectionTrait,
{
    Ok(customers::Entity::find()
        .filter(customers::Column::OrganizationId.eq(organization_id))
        .filter(customers::Column::ReferralCode.eq(code.trim().to_uppercase()))
        .one(db)
        .await?)
}

#[derive(Clone)]
pub struct CustomerService {
    pool: DbPool,
}

impl CustomerService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Enroll a customer. The organization's welcome bonus is credited and
    /// the starting tier resolved from it.
    pub async fn create_customer(
        &self,
        organization_id: Uuid,
        req: CreateCustomerRequest,
    ) -> AppResult<CustomerResponse> {
        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::ValidationError("Customer name is required".to_string()));
        }
        let email = match req.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => {
                validate_email(email)?;
                Some(email.to_lowercase())
            }
            None => None,
        };
        let phone = match req.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(phone) => Some(normalize_phone(phone)?),
            None => None,
        };

        let txn = self.pool.begin().await?;
        let org = lock_organization(&txn, organization_id, LockType::Share).await?;
        let schedule = load_schedule(&txn, organization_id).await?;

        if let Some(email) = &email {
            let taken = customers::Entity::find()
                .filter(customers::Column::OrganizationId.eq(organization_id))
                .filter(customers::Column::Email.eq(email.as_str()))
                .count(&txn)
                .await?;
            if taken > 0 {
                return Err(AppError::ValidationError(
                    "A customer with this email already exists".to_string(),
                ));
            }
        }

        let referred_by = match req.referral_code.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(code) => {
                let referrer = find_by_referral_code(&txn, organization_id, code)
                    .await?
                    .ok_or_else(|| {
                        AppError::ValidationError(format!("Unknown referral code '{code}'"))
                    })?;
                Some(referrer.id)
            }
            None => None,
        };

        let referral_code = generate_unique_referral_code(&txn, organization_id).await?;
        let points = org.welcome_bonus.max(0);
        let tier = schedule.resolve(points);
        let now = Utc::now();

        let customer = customers::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            name: Set(name),
            email: Set(email),
            phone: Set(phone),
            points: Set(points),
            tier: Set(tier.name.clone()),
            total_spent: Set(0),
            visits: Set(0),
            last_visit: Set(None),
            referral_code: Set(referral_code),
            referred_by: Set(referred_by),
            auth_user_id: Set(req.auth_user_id),
            is_active: Set(true),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        }
        .insert(&txn)
        .await?;

        if points > 0 {
            point_transactions::ActiveModel {
                id: Set(Uuid::new_v4()),
                organization_id: Set(organization_id),
                customer_id: Set(customer.id),
                kind: Set(PointTransactionKind::WelcomeBonus),
                points: Set(points),
                amount_cents: Set(None),
                balance_after: Set(points),
                tier_after: Set(tier.name.clone()),
                reward_id: Set(None),
                related_customer_id: Set(None),
                description: Set(Some("Welcome bonus".to_string())),
                created_at: Set(Some(now)),
            }
            .insert(&txn)
            .await?;
        }
        txn.commit().await?;

        log::info!(
            "Enrolled customer {} in organization {} at tier {}",
            customer.id,
            org.slug,
            customer.tier
        );
        Ok(CustomerResponse::new(customer, &schedule))
    }

    pub async fn get_customer(
        &self,
        organization_id: Uuid,
        customer_id: Uuid,
    ) -> AppResult<CustomerResponse> {
        let customer = find_customer(self.pool.as_ref(), organization_id, customer_id).await?;
        let schedule = load_schedule(self.pool.as_ref(), organization_id).await?;
        Ok(CustomerResponse::new(customer, &schedule))
    }

    pub async fn get_by_referral_code(
        &self,
        organization_id: Uuid,
        code: &str,
    ) -> AppResult<CustomerResponse> {
        let customer = find_by_referral_code(self.pool.as_ref(), organization_id, code)
            .await?
            .ok_or_else(|| AppError::NotFound("Referral code not found".to_string()))?;
        let schedule = load_schedule(self.pool.as_ref(), organization_id).await?;
        Ok(CustomerResponse::new(customer, &schedule))
    }

    /// Most recent first. `filter.tier` matches the tier resolved from the
    /// balance, not the stored label.
    pub async fn list_customers(
        &self,
        organization_id: Uuid,
        params: PaginationParams,
        filter: CustomerFilter,
    ) -> AppResult<PaginatedResponse<CustomerResponse>> {
        let schedule = load_schedule(self.pool.as_ref(), organization_id).await?;
        let query = customers::Entity::find()
            .filter(customers::Column::OrganizationId.eq(organization_id));
        let query = apply_filter(query, &filter, &schedule)?;

        let total = query.clone().count(self.pool.as_ref()).await?;
        let items = query
            .order_by_desc(customers::Column::CreatedAt)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(|c| CustomerResponse::new(c, &schedule))
            .collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }

    /// Active customers ranked by balance or by total spent.
    pub async fn top_customers(
        &self,
        organization_id: Uuid,
        params: TopCustomersParams,
    ) -> AppResult<Vec<CustomerResponse>> {
        let schedule = load_schedule(self.pool.as_ref(), organization_id).await?;
        let ranking = match params.get_by() {
            TopCustomersBy::Points => customers::Column::Points,
            TopCustomersBy::Spending => customers::Column::TotalSpent,
        };

        let rows = customers::Entity::find()
            .filter(customers::Column::OrganizationId.eq(organization_id))
            .filter(customers::Column::IsActive.eq(true))
            .order_by_desc(ranking)
            .order_by_asc(customers::Column::CreatedAt)
            .limit(params.get_limit())
            .all(self.pool.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|c| CustomerResponse::new(c, &schedule))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::collections::BTreeMap;
    use crate::entities::loyalty_tier_entity as loyalty_tiers;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

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
            referral_code: "K7MQ2XPA".to_string(),
            referred_by: None,
            auth_user_id: None,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn tier(org: Uuid, name: &str, threshold: i64, multiplier: f64) -> loyalty_tiers::Model {
        loyalty_tiers::Model {
            id: Uuid::new_v4(),
            organization_id: org,
            name: name.to_string(),
            threshold,
            multiplier,
            color: None,
            benefits: serde_json::json!([]),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_customer_flags_stale_tier() {
        let org = Uuid::new_v4();
        let stored = customer(org, 250, "Bronze");
        let id = stored.id;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored]])
            .append_query_results([vec![tier(org, "Base", 0, 1.0), tier(org, "Silver", 100, 1.2)]])
            .into_connection();

        let resp = CustomerService::new(Arc::new(db)).get_customer(org, id).await.unwrap();
        assert_eq!(resp.tier, "Bronze");
        assert_eq!(resp.resolved_tier, "Silver");
        assert!(!resp.tier_in_sync);
        assert_eq!(resp.multiplier, 1.2);
    }

    #[tokio::test]
    async fn test_get_customer_of_other_organization_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<customers::Model>::new()])
            .into_connection();
        let err = CustomerService::new(Arc::new(db))
            .get_customer(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_customer_validates_before_touching_database() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = CustomerService::new(Arc::new(db));
        let req = CreateCustomerRequest {
            name: "Mario".to_string(),
            email: Some("not-an-email".to_string()),
            phone: None,
            referral_code: None,
            auth_user_id: None,
        };
        let err = service.create_customer(Uuid::new_v4(), req).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        assert_eq!(search_pattern(" Rossi "), "%rossi%");
        assert_eq!(search_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[tokio::test]
    async fn test_list_customers_filters_by_resolved_tier_and_search() {
        let org = Uuid::new_v4();
        let count = BTreeMap::from([("num_items", Value::BigInt(Some(1)))]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![tier(org, "Base", 0, 1.0), tier(org, "Silver", 100, 1.2)]])
            .append_query_results([vec![count]])
            .append_query_results([vec![customer(org, 150, "Base")]])
            .into_connection();
        let db = Arc::new(db);

        let filter = CustomerFilter {
            q: Some("GIU".to_string()),
            tier: Some("silver".to_string()),
        };
        let page = CustomerService::new(db.clone())
            .list_customers(org, PaginationParams::default(), filter)
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].resolved_tier, "Silver");

        let db = Arc::try_unwrap(db).ok().unwrap();
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("LOWER"));
        assert!(log.contains("String(Some(\"%giu%\"))"));
        assert!(log.contains("BigInt(Some(100))"));
    }

    #[tokio::test]
    async fn test_list_customers_rejects_unknown_tier() {
        let org = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![tier(org, "Base", 0, 1.0)]])
            .into_connection();
        let filter = CustomerFilter {
            q: None,
            tier: Some("Diamond".to_string()),
        };
        let err = CustomerService::new(Arc::new(db))
            .list_customers(org, PaginationParams::default(), filter)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_top_customers_by_spending() {
        let org = Uuid::new_v4();
        let mut big_spender = customer(org, 40, "Base");
        big_spender.total_spent = 90_000;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![tier(org, "Base", 0, 1.0), tier(org, "Silver", 100, 1.2)]])
            .append_query_results([vec![big_spender, customer(org, 600, "Silver")]])
            .into_connection();
        let db = Arc::new(db);

        let params = TopCustomersParams {
            by: Some(TopCustomersBy::Spending),
            limit: Some(500),
        };
        let top = CustomerService::new(db.clone())
            .top_customers(org, params)
            .await
            .unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].total_spent, 90_000);

        let db = Arc::try_unwrap(db).ok().unwrap();
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("total_spent"));
        assert!(log.contains("DESC"));
        assert!(log.contains("LIMIT"));
    }
}
