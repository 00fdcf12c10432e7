//! HTTP request handlers

pub mod auth;
pub mod health;
pub mod inventory;
pub mod recipes;
pub mod sales;

pub use auth::*;
pub use health::*;
pub use inventory::*;
pub use recipes::*;
pub use sales::*;
