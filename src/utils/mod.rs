pub mod jwt;
pub mod referral_code;
pub mod validation;

pub use jwt::*;
pub use referral_code::{generate_referral_code, generate_unique_referral_code};
pub use validation::*;
