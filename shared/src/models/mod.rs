//! Domain models for the bakery inventory ledger

mod business;
mod inventory;
mod recipe;
mod sale;
mod user;

pub use business::*;
pub use inventory::*;
pub use recipe::*;
pub use sale::*;
pub use user::*;
