use crate::entities::{customer_entity as customers, organization_entity as organizations};
use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{FailedOrganization, OrganizationReconciliation, ReconciliationSummary};
use crate::services::organization_service::lock_organization;
use crate::services::tier_service::load_schedule;
use crate::tier::{TierSchedule, plan_corrections};
use chrono::Utc;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use uuid::Uuid;

const RECONCILE_BATCH_SIZE: u64 = 500;

/// Rewrite every stored tier label of one organization that disagrees with
/// `schedule`.
///
/// Each fix is applied only if the customer's points are still the ones the
/// correction was planned from; rows changed in between are counted as
/// `skipped_concurrent` and left to the writer that changed them.
pub(crate) async fn reconcile_customers<C>(
    db: &C,
    organization_id: Uuid,
    schedule: &TierSchedule,
    dry_run: bool,
) -> AppResult<OrganizationReconciliation>
where
    C: ConnectionTrait,
{
    let mut report = OrganizationReconciliation {
        organization_id,
        dry_run,
        ..Default::default()
    };

    let mut pages = customers::Entity::find()
        .filter(customers::Column::OrganizationId.eq(organization_id))
        .order_by_asc(customers::Column::Id)
        .paginate(db, RECONCILE_BATCH_SIZE);

    while let Some(batch) = pages.fetch_and_next().await? {
        report.scanned += batch.len() as u64;

        for fix in plan_corrections(schedule, batch.iter().map(customers::Model::snapshot)) {
            if !dry_run {
                let res = customers::Entity::update_many()
                    .col_expr(customers::Column::Tier, Expr::value(fix.resolved.clone()))
                    .col_expr(customers::Column::UpdatedAt, Expr::value(Utc::now()))
                    .filter(customers::Column::Id.eq(fix.customer_id))
                    .filter(customers::Column::Points.eq(fix.points))
                    .exec(db)
                    .await?;
                if res.rows_affected == 0 {
                    log::warn!(
                        "Customer {} changed during reconciliation, tier left to the concurrent writer",
                        fix.customer_id
                    );
                    report.skipped_concurrent += 1;
                    continue;
                }
            }
            report.corrected += 1;
            report.corrections.push(fix);
        }
    }

    Ok(report)
}

/// Reconcile one organization inside a transaction that holds a shared lock
/// on its row, so `replace_tiers` cannot swap the schedule mid-scan.
pub(crate) async fn reconcile_tenant(
    db: &DatabaseConnection,
    organization_id: Uuid,
    dry_run: bool,
) -> AppResult<OrganizationReconciliation> {
    let txn = db.begin().await?;
    let org = lock_organization(&txn, organization_id, LockType::Share).await?;
    let schedule = load_schedule(&txn, org.id).await?;
    let report = reconcile_customers(&txn, org.id, &schedule, dry_run).await?;
    txn.commit().await?;

    log::info!(
        "Reconciled organization {}: scanned={} corrected={} skipped_concurrent={} dry_run={}",
        org.slug,
        report.scanned,
        report.corrected,
        report.skipped_concurrent,
        dry_run
    );
    Ok(report)
}

#[derive(Clone)]
pub struct ReconciliationService {
    pool: DbPool,
}

impl ReconciliationService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn reconcile_organization(
        &self,
        organization_id: Uuid,
        dry_run: bool,
    ) -> AppResult<OrganizationReconciliation> {
        reconcile_tenant(self.pool.as_ref(), organization_id, dry_run).await
    }

    /// Reconcile every organization.
    ///
    /// An organization with an unusable tier configuration is reported in
    /// `failed_organizations` and does not stop the others; database errors
    /// abort the run.
    pub async fn reconcile_all(&self, dry_run: bool) -> AppResult<ReconciliationSummary> {
        let orgs = organizations::Entity::find()
            .order_by_asc(organizations::Column::Slug)
            .all(self.pool.as_ref())
            .await?;

        let mut summary = ReconciliationSummary {
            dry_run,
            ..Default::default()
        };

        for org in orgs {
            let report = match reconcile_tenant(self.pool.as_ref(), org.id, dry_run).await {
                Ok(report) => report,
                Err(AppError::ConfigurationError(e)) => {
                    log::error!("Skipping organization {} during reconciliation: {e}", org.slug);
                    summary.failed_organizations.push(FailedOrganization {
                        organization_id: org.id,
                        slug: org.slug,
                        error: e.to_string(),
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };

            summary.push(report);
        }

        log::info!(
            "Reconciliation finished: organizations={} failed={} scanned={} corrected={} dry_run={}",
            summary.organizations.len(),
            summary.failed_organizations.len(),
            summary.total_scanned,
            summary.total_corrected,
            dry_run
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::entities::loyalty_tier_entity as loyalty_tiers;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn org(slug: &str) -> organizations::Model {
        organizations::Model {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            name: slug.to_string(),
            primary_color: None,
            secondary_color: None,
            points_per_currency_unit: 1.0,
            reward_threshold: 100,
            welcome_bonus: 0,
            created_at: None,
            updated_at: None,
        }
    }

    fn tier(org: Uuid, name: &str, threshold: i64) -> loyalty_tiers::Model {
        loyalty_tiers::Model {
            id: Uuid::new_v4(),
            organization_id: org,
            name: name.to_string(),
            threshold,
            multiplier: 1.0,
            color: None,
            benefits: serde_json::json!([]),
            created_at: None,
        }
    }

    fn customer(org: Uuid, points: i64, tier: &str) -> customers::Model {
        customers::Model {
            id: Uuid::new_v4(),
            organization_id: org,
            name: "Test".to_string(),
            email: None,
            phone: None,
            points,
            tier: tier.to_string(),
            total_spent: 0,
            visits: 0,
            last_visit: None,
            referral_code: "ABCDEFGH".to_string(),
            referred_by: None,
            auth_user_id: None,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn schedule() -> TierSchedule {
        TierSchedule::new(vec![
            crate::tier::Tier::new("Base", 0, 1.0),
            crate::tier::Tier::new("Silver", 100, 1.2),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_dry_run_reports_without_writing() {
        let org_id = Uuid::new_v4();
        let stale = customer(org_id, 250, "Bronze");
        let stale_id = stale.id;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stale, customer(org_id, 10, "Base")], vec![]])
            .into_connection();

        let report = reconcile_customers(&db, org_id, &schedule(), true).await.unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.corrected, 1);
        assert_eq!(report.corrections[0].customer_id, stale_id);
        assert_eq!(report.corrections[0].resolved, "Silver");

        // only the two page selects were issued
        assert_eq!(db.into_transaction_log().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_change_is_skipped() {
        let org_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![customer(org_id, 250, "Base"), customer(org_id, 5, "Silver")],
                vec![],
            ])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        let report = reconcile_customers(&db, org_id, &schedule(), false).await.unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.corrected, 1);
        assert_eq!(report.skipped_concurrent, 1);
        assert_eq!(report.corrections.len(), 1);
    }

    #[tokio::test]
    async fn test_reconcile_all_reports_misconfigured_organizations() {
        let broken = org("broken");
        let healthy = org("healthy");
        let healthy_id = healthy.id;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![broken.clone(), healthy.clone()], vec![broken]])
            .append_query_results([Vec::<loyalty_tiers::Model>::new()])
            .append_query_results([vec![healthy]])
            .append_query_results([vec![tier(healthy_id, "Base", 0)]])
            .append_query_results([vec![customer(healthy_id, 0, "Base")], vec![]])
            .into_connection();

        let summary = ReconciliationService::new(Arc::new(db)).reconcile_all(true).await.unwrap();
        assert_eq!(summary.failed_organizations.len(), 1);
        assert_eq!(summary.failed_organizations[0].slug, "broken");
        assert_eq!(summary.organizations.len(), 1);
        assert_eq!(summary.organizations[0].organization_id, healthy_id);
        assert_eq!(summary.total_scanned, 1);
        assert_eq!(summary.total_corrected, 0);
    }

    #[tokio::test]
    async fn test_reconcile_tenant_holds_shared_organization_lock() {
        let tenant = org("acme");
        let org_id = tenant.id;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![tenant]])
            .append_query_results([vec![tier(org_id, "Base", 0), tier(org_id, "Silver", 100)]])
            .append_query_results([vec![customer(org_id, 150, "Base")], vec![]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let report = reconcile_tenant(&db, org_id, false).await.unwrap();
        assert_eq!(report.corrected, 1);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("BEGIN"));
        assert!(log.contains("FOR SHARE"));
        assert!(log.contains("COMMIT"));
    }

    #[tokio::test]
    async fn test_reconcile_tenant_rolls_back_on_empty_tier_set() {
        let tenant = org("empty");
        let org_id = tenant.id;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![tenant]])
            .append_query_results([Vec::<loyalty_tiers::Model>::new()])
            .into_connection();

        let err = reconcile_tenant(&db, org_id, false).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigurationError(_)));

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("FOR SHARE"));
        assert!(!log.contains("UPDATE"));
    }
}
