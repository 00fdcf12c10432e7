//! Opening and closing stock snapshots per period
//!
//! Snapshots are recorded per ISO week. The opening snapshot is written once,
//! when a period is first populated (a reset rewrites it). The closing
//! snapshot mirrors the latest ledger state; history lives in the
//! transaction log.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use shared::{
    Ingredient, InventorySnapshot, OpeningClosing, Period, PeriodType, SnapshotRole, StockLevels,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Snapshot store for one database
#[derive(Clone)]
pub struct SnapshotStore {
    db: PgPool,
}

/// How a write treats an existing snapshot for the same key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    InsertOnly,
    Replace,
}

/// Row for snapshot queries
#[derive(Debug, FromRow)]
struct SnapshotRow {
    business_id: Uuid,
    year: i32,
    month: i32,
    week: i32,
    role: String,
    period_start: NaiveDate,
    period_end: NaiveDate,
    ingredient: String,
    amount: i64,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<SnapshotRow> for InventorySnapshot {
    type Error = AppError;

    fn try_from(row: SnapshotRow) -> Result<Self, Self::Error> {
        let role = match row.role.as_str() {
            "opening" => SnapshotRole::Opening,
            "closing" => SnapshotRole::Closing,
            other => return Err(AppError::Internal(format!("Unknown snapshot role: {}", other))),
        };
        Ok(InventorySnapshot {
            business_id: row.business_id,
            period: period_from_columns(row.year, row.month, row.week)?,
            period_type: PeriodType::Week,
            role,
            period_start: row.period_start,
            period_end: row.period_end,
            ingredient: parse_ingredient(&row.ingredient)?,
            amount: row.amount,
            recorded_at: row.recorded_at,
        })
    }
}

impl SnapshotStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record the opening snapshot; an existing one wins
    pub async fn record_opening_in(
        &self,
        conn: &mut PgConnection,
        business_id: Uuid,
        period: Period,
        levels: &StockLevels,
    ) -> AppResult<()> {
        Self::write_in(conn, business_id, period, SnapshotRole::Opening, levels, WriteMode::InsertOnly)
            .await
    }

    /// Overwrite the opening snapshot (reset only)
    pub async fn replace_opening_in(
        &self,
        conn: &mut PgConnection,
        business_id: Uuid,
        period: Period,
        levels: &StockLevels,
    ) -> AppResult<()> {
        Self::write_in(conn, business_id, period, SnapshotRole::Opening, levels, WriteMode::Replace)
            .await
    }

    /// Record the closing snapshot, replacing any previous one
    pub async fn record_closing_in(
        &self,
        conn: &mut PgConnection,
        business_id: Uuid,
        period: Period,
        levels: &StockLevels,
    ) -> AppResult<()> {
        Self::write_in(conn, business_id, period, SnapshotRole::Closing, levels, WriteMode::Replace)
            .await
    }

    async fn write_in(
        conn: &mut PgConnection,
        business_id: Uuid,
        period: Period,
        role: SnapshotRole,
        levels: &StockLevels,
        mode: WriteMode,
    ) -> AppResult<()> {
        if levels.is_empty() {
            return Ok(());
        }

        let ingredients: Vec<String> = levels.keys().map(|i| i.as_str().to_string()).collect();
        let amounts: Vec<i64> = levels.values().copied().collect();

        let conflict = match mode {
            WriteMode::InsertOnly => "DO NOTHING",
            WriteMode::Replace => {
                "DO UPDATE SET amount = EXCLUDED.amount, recorded_at = EXCLUDED.recorded_at"
            }
        };

        let sql = format!(
            r#"
            INSERT INTO inventory_snapshots (
                business_id, year, month, week, period_type, role,
                period_start, period_end, ingredient, amount, recorded_at
            )
            SELECT $1, $2, $3, $4, 'week', $5, $6, $7, s.ingredient, s.amount, NOW()
            FROM UNNEST($8::TEXT[], $9::BIGINT[]) AS s(ingredient, amount)
            ON CONFLICT ON CONSTRAINT inventory_snapshots_key {}
            "#,
            conflict
        );

        sqlx::query(&sql)
            .bind(business_id)
            .bind(period.year)
            .bind(period.month as i32)
            .bind(period.week as i32)
            .bind(role.as_str())
            .bind(period.week_start())
            .bind(period.week_end())
            .bind(&ingredients)
            .bind(&amounts)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Opening and closing levels for a week, month or year.
    ///
    /// A month or year opens with the opening snapshot of its earliest
    /// recorded week and closes with the closing snapshot of its latest one.
    pub async fn opening_closing(
        &self,
        business_id: Uuid,
        year: i32,
        period_type: PeriodType,
        period_value: Option<u32>,
    ) -> AppResult<OpeningClosing> {
        let (month, week) = match period_type {
            PeriodType::Year => (None, None),
            PeriodType::Month => (Some(required_value(period_value, "month")?), None),
            PeriodType::Week => (None, Some(required_value(period_value, "week")?)),
        };

        let rows = sqlx::query_as::<_, SnapshotRow>(
            r#"
            SELECT business_id, year, month, week, role, period_start, period_end,
                   ingredient, amount, recorded_at
            FROM inventory_snapshots
            WHERE business_id = $1 AND year = $2 AND period_type = 'week'
              AND ($3::INT IS NULL OR month = $3)
              AND ($4::INT IS NULL OR week = $4)
            ORDER BY period_start, month, ingredient
            "#,
        )
        .bind(business_id)
        .bind(year)
        .bind(month)
        .bind(week)
        .fetch_all(&self.db)
        .await?;

        let snapshots = rows
            .into_iter()
            .map(InventorySnapshot::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        let period_value = match period_type {
            PeriodType::Year => u32::try_from(year).unwrap_or_default(),
            _ => period_value.unwrap_or_default(),
        };

        Ok(select_opening_closing(year, period_type, period_value, &snapshots))
    }
}

fn required_value(value: Option<u32>, field: &str) -> AppResult<i32> {
    value
        .map(|v| v as i32)
        .ok_or_else(|| AppError::validation("period_value", format!("A {} number is required", field)))
}

/// Pick the earliest opening and the latest closing among week snapshots
fn select_opening_closing(
    year: i32,
    period_type: PeriodType,
    period_value: u32,
    snapshots: &[InventorySnapshot],
) -> OpeningClosing {
    // (week start, month, week) orders weeks chronologically even when a
    // boundary week is recorded under two months.
    let mut by_period: BTreeMap<(NaiveDate, u32, u32), Vec<&InventorySnapshot>> = BTreeMap::new();
    for snapshot in snapshots {
        by_period
            .entry((snapshot.period_start, snapshot.period.month, snapshot.period.week))
            .or_default()
            .push(snapshot);
    }

    let opening = by_period
        .values()
        .find_map(|rows| levels_for(SnapshotRole::Opening, rows.as_slice()))
        .unwrap_or_default();
    let closing = by_period
        .values()
        .rev()
        .find_map(|rows| levels_for(SnapshotRole::Closing, rows.as_slice()))
        .unwrap_or_default();

    OpeningClosing {
        year,
        period_type,
        period_value,
        period_start: snapshots.iter().map(|s| s.period_start).min(),
        period_end: snapshots.iter().map(|s| s.period_end).max(),
        opening,
        closing,
    }
}

fn levels_for(role: SnapshotRole, rows: &[&InventorySnapshot]) -> Option<StockLevels> {
    let levels: StockLevels = rows
        .iter()
        .filter(|s| s.role == role)
        .map(|s| (s.ingredient, s.amount))
        .collect();
    (!levels.is_empty()).then_some(levels)
}

/// Convert stored period columns into a validated period
pub(crate) fn period_from_columns(year: i32, month: i32, week: i32) -> AppResult<Period> {
    let month = u32::try_from(month)
        .map_err(|_| AppError::Internal(format!("Invalid stored month: {}", month)))?;
    let week = u32::try_from(week)
        .map_err(|_| AppError::Internal(format!("Invalid stored week: {}", week)))?;
    Period::new(year, month, week)
        .map_err(|e| AppError::Internal(format!("Invalid stored period: {}", e)))
}

pub(crate) fn parse_ingredient(name: &str) -> AppResult<Ingredient> {
    name.parse::<Ingredient>()
        .map_err(|e| AppError::Internal(format!("Corrupt ledger row: {}", e)))
}
