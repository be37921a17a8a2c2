pub mod customer_notifications;
pub mod customers;
pub mod loyalty_tiers;
pub mod organizations;
pub mod point_transactions;
pub mod rewards;

pub use customer_notifications as notification_entity;
pub use customers as customer_entity;
pub use loyalty_tiers as loyalty_tier_entity;
pub use organizations as organization_entity;
pub use point_transactions as point_transaction_entity;
pub use point_transactions::PointTransactionKind;
pub use rewards as reward_entity;
