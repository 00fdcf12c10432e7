//! Shared types and ledger logic for the bakery inventory platform
//!
//! This crate contains the pure parts of the ledger (periods, recipes,
//! consumption, stock classification) shared between the backend and the
//! browser client (via WASM).

pub mod catalog;
pub mod consumption;
pub mod error;
pub mod models;
pub mod period;
pub mod seed;
pub mod stock;
pub mod types;
pub mod validation;

pub use catalog::*;
pub use consumption::*;
pub use error::*;
pub use models::*;
pub use period::*;
pub use seed::*;
pub use stock::*;
pub use types::*;
pub use validation::*;
