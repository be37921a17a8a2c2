pub mod customer_service;
pub mod ledger_service;
pub mod organization_service;
pub mod reconciliation_service;
pub mod reward_service;
pub mod tier_service;

pub use customer_service::*;
pub use ledger_service::*;
pub use organization_service::*;
pub use reconciliation_service::*;
pub use reward_service::*;
pub use tier_service::*;
