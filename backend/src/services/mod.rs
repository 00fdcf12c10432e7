//! Business logic services for the bakery inventory ledger

pub mod auth;
pub mod inventory;
pub mod period_lock;
pub mod recipe;
pub mod sales;
pub mod snapshot;
pub mod transaction_log;

pub use auth::AuthService;
pub use inventory::InventoryService;
pub use period_lock::PeriodLocks;
pub use recipe::RecipeService;
pub use sales::SalesService;
