//! Loyalty tier computation.
//!
//! Everything in this module is pure: no I/O, no shared state. Services load
//! tier rows from the database, build a [`TierSchedule`] and ask it questions.

pub mod accrual;
pub mod eligibility;
pub mod error;
pub mod reconcile;
pub mod resolver;

pub use accrual::points_for_purchase;
pub use eligibility::{Ineligible, RewardTerms, check_reward};
pub use error::{AccrualError, TierConfigError};
pub use reconcile::{TierCorrection, TierSnapshot, plan_corrections};
pub use resolver::{Tier, TierSchedule, resolve_tier};
