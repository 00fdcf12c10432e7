//! Inventory ledger models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::period::{Period, PeriodType};
use crate::stock::StockLevels;
use crate::types::Ingredient;

/// Current stock of one ingredient in one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub business_id: Uuid,
    #[serde(flatten)]
    pub period: Period,
    pub ingredient: Ingredient,
    pub amount: i64,
}

/// Which end of a period a snapshot captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotRole {
    /// Written once when the period is first populated
    Opening,
    /// Replaced on every ledger-changing operation
    Closing,
}

impl SnapshotRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotRole::Opening => "opening",
            SnapshotRole::Closing => "closing",
        }
    }
}

/// Recorded copy of one ingredient's level at a period boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub business_id: Uuid,
    #[serde(flatten)]
    pub period: Period,
    pub period_type: PeriodType,
    pub role: SnapshotRole,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub ingredient: Ingredient,
    pub amount: i64,
    pub recorded_at: DateTime<Utc>,
}

/// Opening and latest closing levels for a week, month or year
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpeningClosing {
    pub year: i32,
    pub period_type: PeriodType,
    pub period_value: u32,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub opening: StockLevels,
    pub closing: StockLevels,
}

/// Why a stock adjustment happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Sale,
    ManualAdjustment,
    Reset,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Sale => "sale",
            TransactionKind::ManualAdjustment => "manual_adjustment",
            TransactionKind::Reset => "reset",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sale" => Some(TransactionKind::Sale),
            "manual_adjustment" => Some(TransactionKind::ManualAdjustment),
            "reset" => Some(TransactionKind::Reset),
            _ => None,
        }
    }
}

/// Immutable audit record of one signed stock adjustment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryTransaction {
    pub id: Uuid,
    pub business_id: Uuid,
    #[serde(flatten)]
    pub period: Period,
    pub ingredient: Ingredient,
    pub amount_delta: i64,
    pub kind: TransactionKind,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
}
