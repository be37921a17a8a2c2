pub mod common;
pub mod customer;
pub mod organization;
pub mod pagination;
pub mod reconciliation;
pub mod reward;
pub mod tier;
pub mod transaction;

pub use common::*;
pub use customer::*;
pub use organization::*;
pub use pagination::*;
pub use reconciliation::*;
pub use reward::*;
pub use tier::*;
pub use transaction::*;
