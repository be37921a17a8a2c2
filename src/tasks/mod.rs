//! Background jobs. Call `spawn_all` once during startup.

use crate::config::LoyaltyConfig;
use crate::services::ReconciliationService;

/// Spawn all background tasks.
///
/// The tier reconciliation pass rewrites stale tier labels left behind by
/// direct database edits or interrupted writes. It is skipped entirely when
/// `reconcile_interval_secs` is 0.
pub fn spawn_all(reconciliation_service: ReconciliationService, loyalty: &LoyaltyConfig) {
    if loyalty.reconcile_interval_secs == 0 {
        log::info!("Periodic tier reconciliation disabled");
        return;
    }

    let interval = std::time::Duration::from_secs(loyalty.reconcile_interval_secs);
    let svc = reconciliation_service.clone();
    tokio::spawn(async move {
        loop {
            match svc.reconcile_all(false).await {
                Ok(summary) if summary.total_corrected > 0 => {
                    log::info!("Tier reconciliation corrected {} customers", summary.total_corrected)
                }
                Ok(_) => {}
                Err(e) => log::error!("Tier reconciliation failed: {e:?}"),
            }
            tokio::time::sleep(interval).await;
        }
    });
}
