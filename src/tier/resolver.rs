use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

use super::error::TierConfigError;

/// One loyalty level of an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Tier {
    #[schema(example = "Silver")]
    pub name: String,
    /// Minimum points balance for this tier
    #[schema(example = 100)]
    pub threshold: i64,
    /// Accrual multiplier applied to purchases while in this tier
    #[schema(example = 1.2)]
    pub multiplier: f64,
    #[serde(default)]
    #[schema(example = "#64748b")]
    pub color: Option<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
}

impl Tier {
    pub fn new(name: impl Into<String>, threshold: i64, multiplier: f64) -> Self {
        Self {
            name: name.into(),
            threshold,
            multiplier,
            color: None,
            benefits: Vec::new(),
        }
    }
}

/// A validated tier set, sorted ascending by threshold.
///
/// Construction rejects every configuration the resolver could not answer
/// deterministically: an empty set, negative thresholds, non-positive
/// multipliers, and two tiers sharing a threshold or a name.
#[derive(Debug, Clone, PartialEq)]
pub struct TierSchedule {
    tiers: Vec<Tier>,
}

impl TierSchedule {
    pub fn new(mut tiers: Vec<Tier>) -> Result<Self, TierConfigError> {
        if tiers.is_empty() {
            return Err(TierConfigError::EmptyTiers);
        }

        let mut names = HashSet::with_capacity(tiers.len());
        for tier in &tiers {
            let name = tier.name.trim();
            if name.is_empty() {
                return Err(TierConfigError::BlankName);
            }
            if tier.threshold < 0 {
                return Err(TierConfigError::NegativeThreshold {
                    name: tier.name.clone(),
                    threshold: tier.threshold,
                });
            }
            if !tier.multiplier.is_finite() || tier.multiplier <= 0.0 {
                return Err(TierConfigError::InvalidMultiplier {
                    name: tier.name.clone(),
                    multiplier: tier.multiplier,
                });
            }
            if !names.insert(name.to_lowercase()) {
                return Err(TierConfigError::DuplicateName(tier.name.clone()));
            }
        }

        tiers.sort_by_key(|t| t.threshold);

        if let Some(pair) = tiers.windows(2).find(|w| w[0].threshold == w[1].threshold) {
            return Err(TierConfigError::DuplicateThreshold {
                threshold: pair[0].threshold,
                first: pair[0].name.clone(),
                second: pair[1].name.clone(),
            });
        }

        Ok(Self { tiers })
    }

    /// Highest tier whose threshold is `<= points`, or the base tier when the
    /// balance is below every threshold.
    pub fn resolve(&self, points: i64) -> &Tier {
        let qualifying = self.tiers.partition_point(|t| t.threshold <= points);
        &self.tiers[qualifying.saturating_sub(1)]
    }

    /// First tier above `points`, if the balance has not reached the top.
    pub fn next_tier(&self, points: i64) -> Option<&Tier> {
        let qualifying = self.tiers.partition_point(|t| t.threshold <= points);
        self.tiers.get(qualifying)
    }

    /// The lowest tier.
    pub fn base(&self) -> &Tier {
        &self.tiers[0]
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Case-insensitive lookup by tier name.
    pub fn find(&self, name: &str) -> Option<&Tier> {
        let name = name.trim();
        self.tiers.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Position of a tier in ascending prestige order (0 = base).
    pub fn rank_of(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.tiers.iter().position(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Points range `[lower, upper)` that resolves to the named tier. The base
    /// tier has no lower bound because negative balances resolve to it, and
    /// the top tier has no upper bound.
    pub fn bounds_of(&self, name: &str) -> Option<(Option<i64>, Option<i64>)> {
        let rank = self.rank_of(name)?;
        let lower = (rank > 0).then(|| self.tiers[rank].threshold);
        let upper = self.tiers.get(rank + 1).map(|t| t.threshold);
        Some((lower, upper))
    }

    pub fn into_tiers(self) -> Vec<Tier> {
        self.tiers
    }
}

/// Validates `tiers` and resolves `points` against them in one step.
pub fn resolve_tier(points: i64, tiers: &[Tier]) -> Result<Tier, TierConfigError> {
    let schedule = TierSchedule::new(tiers.to_vec())?;
    Ok(schedule.resolve(points).clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn standard() -> Vec<Tier> {
        vec![
            Tier::new("Base", 0, 1.0),
            Tier::new("Silver", 100, 1.2),
            Tier::new("Gold", 500, 1.5),
            Tier::new("Platinum", 1000, 2.0),
        ]
    }

    #[test]
    fn test_zero_points_resolves_to_base() {
        let tiers = vec![
            Tier::new("Base", 0, 1.0),
            Tier::new("Silver", 100, 1.2),
            Tier::new("Gold", 500, 1.5),
        ];
        assert_eq!(resolve_tier(0, &tiers).unwrap().name, "Base");
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let schedule = TierSchedule::new(standard()).unwrap();
        assert_eq!(schedule.resolve(99).name, "Base");
        assert_eq!(schedule.resolve(100).name, "Silver");
        assert_eq!(schedule.resolve(499).name, "Silver");
        assert_eq!(schedule.resolve(500).name, "Gold");
        assert_eq!(schedule.resolve(1000).name, "Platinum");
        assert_eq!(schedule.resolve(1_000_000).name, "Platinum");
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let tiers = vec![
            Tier::new("Gold", 500, 1.5),
            Tier::new("Base", 0, 1.0),
            Tier::new("Silver", 100, 1.2),
        ];
        let tier = resolve_tier(150, &tiers).unwrap();
        assert_eq!(tier.name, "Silver");
        assert_eq!(tier.multiplier, 1.2);
    }

    #[test]
    fn test_below_every_threshold_falls_back_to_lowest() {
        let tiers = vec![Tier::new("Silver", 100, 1.2), Tier::new("Gold", 500, 1.5)];
        let schedule = TierSchedule::new(tiers).unwrap();
        assert_eq!(schedule.resolve(10).name, "Silver");
        assert_eq!(schedule.resolve(-5).name, "Silver");
        assert_eq!(schedule.base().name, "Silver");
    }

    #[test]
    fn test_empty_tiers_is_configuration_error() {
        assert_eq!(resolve_tier(0, &[]), Err(TierConfigError::EmptyTiers));
        assert_eq!(resolve_tier(500, &[]), Err(TierConfigError::EmptyTiers));
    }

    #[test]
    fn test_duplicate_threshold_rejected() {
        let tiers = vec![
            Tier::new("Base", 0, 1.0),
            Tier::new("Silver", 100, 1.2),
            Tier::new("Argento", 100, 1.3),
        ];
        match TierSchedule::new(tiers) {
            Err(TierConfigError::DuplicateThreshold { threshold, .. }) => {
                assert_eq!(threshold, 100)
            }
            other => panic!("expected duplicate threshold error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_definitions_rejected() {
        assert_eq!(
            TierSchedule::new(vec![Tier::new("  ", 0, 1.0)]),
            Err(TierConfigError::BlankName)
        );
        assert!(matches!(
            TierSchedule::new(vec![Tier::new("Base", -1, 1.0)]),
            Err(TierConfigError::NegativeThreshold { .. })
        ));
        assert!(matches!(
            TierSchedule::new(vec![Tier::new("Base", 0, 0.0)]),
            Err(TierConfigError::InvalidMultiplier { .. })
        ));
        assert!(matches!(
            TierSchedule::new(vec![Tier::new("Base", 0, f64::NAN)]),
            Err(TierConfigError::InvalidMultiplier { .. })
        ));
        assert_eq!(
            TierSchedule::new(vec![Tier::new("Gold", 0, 1.0), Tier::new("gold", 10, 1.0)]),
            Err(TierConfigError::DuplicateName("gold".to_string()))
        );
    }

    #[test]
    fn test_next_tier() {
        let schedule = TierSchedule::new(standard()).unwrap();
        assert_eq!(schedule.next_tier(0).map(|t| t.name.as_str()), Some("Silver"));
        assert_eq!(schedule.next_tier(100).map(|t| t.name.as_str()), Some("Gold"));
        assert_eq!(schedule.next_tier(1000), None);
    }

    #[test]
    fn test_find_and_rank_ignore_case() {
        let schedule = TierSchedule::new(standard()).unwrap();
        assert_eq!(schedule.find("gold").map(|t| t.threshold), Some(500));
        assert_eq!(schedule.rank_of("PLATINUM"), Some(3));
        assert_eq!(schedule.rank_of("Bronze"), None);
    }

    #[test]
    fn test_bounds_of_tier() {
        let schedule = TierSchedule::new(vec![
            Tier::new("Base", 0, 1.0),
            Tier::new("Silver", 100, 1.2),
            Tier::new("Gold", 500, 1.5),
        ])
        .unwrap();
        assert_eq!(schedule.bounds_of("base"), Some((None, Some(100))));
        assert_eq!(schedule.bounds_of("Silver"), Some((Some(100), Some(500))));
        assert_eq!(schedule.bounds_of("GOLD"), Some((Some(500), None)));
        assert_eq!(schedule.bounds_of("Platinum"), None);
    }

    fn arb_tiers() -> impl Strategy<Value = Vec<Tier>> {
        proptest::collection::btree_set(0i64..5_000, 1..8).prop_map(|thresholds| {
            thresholds
                .into_iter()
                .enumerate()
                .map(|(i, threshold)| Tier::new(format!("T{i}"), threshold, 1.0 + i as f64 / 10.0))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_resolution_is_monotonic(tiers in arb_tiers(), a in 0i64..10_000, b in 0i64..10_000) {
            let schedule = TierSchedule::new(tiers).unwrap();
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let low_rank = schedule.rank_of(&schedule.resolve(low).name).unwrap();
            let high_rank = schedule.rank_of(&schedule.resolve(high).name).unwrap();
            prop_assert!(low_rank <= high_rank);
        }

        #[test]
        fn prop_resolution_is_idempotent(tiers in arb_tiers(), points in 0i64..10_000) {
            let first = resolve_tier(points, &tiers).unwrap();
            let second = resolve_tier(points, &tiers).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_resolved_tier_qualifies(tiers in arb_tiers(), points in 0i64..10_000) {
            let schedule = TierSchedule::new(tiers).unwrap();
            let tier = schedule.resolve(points);
            if tier.threshold <= points {
                prop_assert!(schedule.tiers().iter().all(|t| t.threshold <= tier.threshold || t.threshold > points));
            } else {
                prop_assert_eq!(tier, schedule.base());
            }
        }
    }
}
