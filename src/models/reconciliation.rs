use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::tier::TierCorrection;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReconcileQuery {
    /// Report drift without writing corrections
    pub dry_run: Option<bool>,
}

/// Outcome of reconciling one organization.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct OrganizationReconciliation {
    pub organization_id: Uuid,
    pub dry_run: bool,
    pub scanned: u64,
    /// Rows whose stored tier was rewritten (or would be, on a dry run)
    pub corrected: u64,
    /// Corrections dropped because points changed concurrently
    pub skipped_concurrent: u64,
    pub corrections: Vec<TierCorrection>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FailedOrganization {
    pub organization_id: Uuid,
    pub slug: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ReconciliationSummary {
    pub dry_run: bool,
    pub organizations: Vec<OrganizationReconciliation>,
    pub failed_organizations: Vec<FailedOrganization>,
    pub total_scanned: u64,
    pub total_corrected: u64,
}

impl ReconciliationSummary {
    pub fn push(&mut self, report: OrganizationReconciliation) {
        self.total_scanned += report.scanned;
        self.total_corrected += report.corrected;
        self.organizations.push(report);
    }
}
