use chrono::{DateTime, Utc};
use thiserror::Error;

use super::resolver::TierSchedule;

/// The parts of a reward that decide whether a customer may redeem it.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardTerms {
    pub points_required: i64,
    /// Organization-wide balance a customer must hold before redeeming anything
    pub min_balance: i64,
    pub required_tier: Option<String>,
    pub stock_quantity: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Ineligible {
    #[error("reward is not active")]
    Inactive,

    #[error("reward is out of stock")]
    OutOfStock,

    #[error("reward is not valid yet")]
    NotYetValid,

    #[error("reward has expired")]
    Expired,

    #[error("reward needs {required} points, customer has {available}")]
    InsufficientPoints { required: i64, available: i64 },

    #[error("redemptions open at {threshold} points, customer has {available}")]
    BelowRewardThreshold { threshold: i64, available: i64 },

    #[error("reward requires unknown tier '{0}'")]
    UnknownTier(String),

    #[error("reward requires tier '{required}', customer is '{current}'")]
    TierTooLow { required: String, current: String },
}

/// Decide whether a customer holding `points` may redeem a reward.
///
/// The customer's tier is always recomputed from `points`; the stored tier
/// column is never consulted.
pub fn check_reward(
    schedule: &TierSchedule,
    points: i64,
    terms: &RewardTerms,
    now: DateTime<Utc>,
) -> Result<(), Ineligible> {
    if !terms.is_active {
        return Err(Ineligible::Inactive);
    }
    if matches!(terms.stock_quantity, Some(stock) if stock <= 0) {
        return Err(Ineligible::OutOfStock);
    }
    if matches!(terms.valid_from, Some(from) if from > now) {
        return Err(Ineligible::NotYetValid);
    }
    if matches!(terms.valid_until, Some(until) if until < now) {
        return Err(Ineligible::Expired);
    }
    if points < terms.min_balance {
        return Err(Ineligible::BelowRewardThreshold {
            threshold: terms.min_balance,
            available: points,
        });
    }
    if points < terms.points_required {
        return Err(Ineligible::InsufficientPoints {
            required: terms.points_required,
            available: points,
        });
    }

    if let Some(required) = &terms.required_tier {
        let required_tier = schedule
            .find(required)
            .ok_or_else(|| Ineligible::UnknownTier(required.clone()))?;
        let current = schedule.resolve(points);
        if current.threshold < required_tier.threshold {
            return Err(Ineligible::TierTooLow {
                required: required_tier.name.clone(),
                current: current.name.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::Tier;
    use chrono::Duration;

    fn schedule() -> TierSchedule {
        TierSchedule::new(vec![
            Tier::new("Base", 0, 1.0),
            Tier::new("Silver", 100, 1.2),
            Tier::new("Gold", 500, 1.5),
        ])
        .unwrap()
    }

    fn terms(points_required: i64, required_tier: Option<&str>) -> RewardTerms {
        RewardTerms {
            points_required,
            min_balance: 0,
            required_tier: required_tier.map(str::to_string),
            stock_quantity: None,
            valid_from: None,
            valid_until: None,
            is_active: true,
        }
    }

    #[test]
    fn test_eligible_when_points_and_tier_suffice() {
        let now = Utc::now();
        assert_eq!(check_reward(&schedule(), 600, &terms(50, Some("Gold")), now), Ok(()));
        assert_eq!(check_reward(&schedule(), 50, &terms(50, None), now), Ok(()));
    }

    #[test]
    fn test_tier_is_recomputed_from_points() {
        // 150 points is Silver whatever label the customer row carries
        let err = check_reward(&schedule(), 150, &terms(10, Some("gold")), Utc::now());
        assert_eq!(
            err,
            Err(Ineligible::TierTooLow {
                required: "Gold".to_string(),
                current: "Silver".to_string(),
            })
        );
    }

    #[test]
    fn test_insufficient_points() {
        assert_eq!(
            check_reward(&schedule(), 20, &terms(50, None), Utc::now()),
            Err(Ineligible::InsufficientPoints {
                required: 50,
                available: 20
            })
        );
    }

    #[test]
    fn test_unknown_required_tier() {
        assert_eq!(
            check_reward(&schedule(), 900, &terms(0, Some("Diamond")), Utc::now()),
            Err(Ineligible::UnknownTier("Diamond".to_string()))
        );
    }

    #[test]
    fn test_availability_window_and_stock() {
        let now = Utc::now();
        let mut t = terms(0, None);
        t.stock_quantity = Some(0);
        assert_eq!(check_reward(&schedule(), 10, &t, now), Err(Ineligible::OutOfStock));

        let mut t = terms(0, None);
        t.valid_from = Some(now + Duration::days(1));
        assert_eq!(check_reward(&schedule(), 10, &t, now), Err(Ineligible::NotYetValid));

        let mut t = terms(0, None);
        t.valid_until = Some(now - Duration::days(1));
        assert_eq!(check_reward(&schedule(), 10, &t, now), Err(Ineligible::Expired));

        let mut t = terms(0, None);
        t.is_active = false;
        assert_eq!(check_reward(&schedule(), 10, &t, now), Err(Ineligible::Inactive));
    }

    #[test]
    fn test_reward_threshold_gates_cheap_rewards() {
        let mut t = terms(20, None);
        t.min_balance = 100;
        assert_eq!(
            check_reward(&schedule(), 60, &t, Utc::now()),
            Err(Ineligible::BelowRewardThreshold {
                threshold: 100,
                available: 60
            })
        );
        assert_eq!(check_reward(&schedule(), 100, &t, Utc::now()), Ok(()));
    }
}
