use thiserror::Error;

/// Malformed tier configuration for an organization.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TierConfigError {
    #[error("organization has no loyalty tiers configured")]
    EmptyTiers,

    #[error("tier name must not be blank")]
    BlankName,

    #[error("tier '{name}' has negative threshold {threshold}")]
    NegativeThreshold { name: String, threshold: i64 },

    #[error("tier '{name}' has invalid multiplier {multiplier}")]
    InvalidMultiplier { name: String, multiplier: f64 },

    #[error("tiers '{first}' and '{second}' share threshold {threshold}")]
    DuplicateThreshold {
        threshold: i64,
        first: String,
        second: String,
    },

    #[error("tier name '{0}' is used more than once")]
    DuplicateName(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccrualError {
    #[error("purchase amount must not be negative, got {0} cents")]
    NegativeAmount(i64),

    #[error("points-per-currency-unit rate must be a finite non-negative number, got {0}")]
    InvalidRate(f64),
}
