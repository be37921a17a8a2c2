use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::resolver::TierSchedule;

/// Stored state of one customer, as read before reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct TierSnapshot {
    pub customer_id: Uuid,
    pub points: i64,
    pub stored_tier: String,
}

/// A customer whose stored tier label disagrees with the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TierCorrection {
    pub customer_id: Uuid,
    pub points: i64,
    /// Label currently stored on the customer row
    pub stored: String,
    /// Label the resolver computes for `points`
    pub resolved: String,
}

/// Diff stored tier labels against the schedule.
///
/// Labels are compared exactly, so a stale label (a tier that no longer
/// exists) and a label with the wrong case are both corrected.
pub fn plan_corrections<I>(schedule: &TierSchedule, customers: I) -> Vec<TierCorrection>
where
    I: IntoIterator<Item = TierSnapshot>,
{
    customers
        .into_iter()
        .filter_map(|c| {
            let resolved = &schedule.resolve(c.points).name;
            (c.stored_tier != *resolved).then(|| TierCorrection {
                customer_id: c.customer_id,
                points: c.points,
                stored: c.stored_tier,
                resolved: resolved.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::Tier;

    fn schedule() -> TierSchedule {
        TierSchedule::new(vec![
            Tier::new("Base", 0, 1.0),
            Tier::new("Silver", 100, 1.2),
            Tier::new("Gold", 500, 1.5),
            Tier::new("Platinum", 1000, 2.0),
        ])
        .unwrap()
    }

    fn snapshot(points: i64, tier: &str) -> TierSnapshot {
        TierSnapshot {
            customer_id: Uuid::new_v4(),
            points,
            stored_tier: tier.to_string(),
        }
    }

    #[test]
    fn test_stale_label_is_overwritten() {
        let stale = snapshot(250, "Bronze");
        let id = stale.customer_id;
        let plan = plan_corrections(&schedule(), vec![stale]);
        assert_eq!(
            plan,
            vec![TierCorrection {
                customer_id: id,
                points: 250,
                stored: "Bronze".to_string(),
                resolved: "Silver".to_string(),
            }]
        );
    }

    #[test]
    fn test_consistent_rows_are_left_alone() {
        let plan = plan_corrections(
            &schedule(),
            vec![snapshot(0, "Base"), snapshot(500, "Gold"), snapshot(1200, "Platinum")],
        );
        assert!(plan.is_empty());
    }

    #[test]
    fn test_case_mismatch_is_corrected() {
        let plan = plan_corrections(&schedule(), vec![snapshot(600, "gold")]);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].resolved, "Gold");
    }

    #[test]
    fn test_applying_plan_is_idempotent() {
        let schedule = schedule();
        let rows = vec![snapshot(250, "Bronze"), snapshot(40, "Gold"), snapshot(999, "Gold")];
        let plan = plan_corrections(&schedule, rows.clone());
        assert_eq!(plan.len(), 2);

        let repaired: Vec<TierSnapshot> = rows
            .into_iter()
            .map(|mut row| {
                if let Some(fix) = plan.iter().find(|c| c.customer_id == row.customer_id) {
                    row.stored_tier = fix.resolved.clone();
                }
                row
            })
            .collect();
        assert!(plan_corrections(&schedule, repaired).is_empty());
    }
}
