//! Sales log and sale report models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consumption::Consumption;
use crate::period::Period;
use crate::stock::StockLevels;

/// One completed sale line; indexed by year only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub year: i32,
    pub item: String,
    pub quantity: i64,
    pub date: NaiveDate,
}

/// Outcome of applying a sales report to the ledger
#[derive(Debug, Clone, Serialize)]
pub struct SaleReport {
    pub period: Period,
    pub ingredients_used: Consumption,
    pub remaining: StockLevels,
    pub alerts: Vec<String>,
    pub deficits: Vec<String>,
}
