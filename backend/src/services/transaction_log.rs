//! Append-only audit trail of stock adjustments

use chrono::{DateTime, Utc};
use shared::{Ingredient, InventoryTransaction, Period, PeriodScope, TransactionKind};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::snapshot::{parse_ingredient, period_from_columns};

/// Transaction log for one database; exposes no update or delete
#[derive(Clone)]
pub struct TransactionLog {
    db: PgPool,
}

/// One adjustment to append
#[derive(Debug, Clone, Copy)]
pub struct NewTransaction {
    pub business_id: Uuid,
    pub period: Period,
    pub ingredient: Ingredient,
    pub amount_delta: i64,
    pub kind: TransactionKind,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
}

/// Row for transaction queries
#[derive(Debug, FromRow)]
struct TransactionRow {
    id: Uuid,
    business_id: Uuid,
    year: i32,
    month: i32,
    week: i32,
    ingredient: String,
    amount_delta: i64,
    kind: String,
    created_at: DateTime<Utc>,
    user_id: Uuid,
}

impl TryFrom<TransactionRow> for InventoryTransaction {
    type Error = AppError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let kind = TransactionKind::parse(&row.kind)
            .ok_or_else(|| AppError::Internal(format!("Unknown transaction kind: {}", row.kind)))?;
        Ok(InventoryTransaction {
            id: row.id,
            business_id: row.business_id,
            period: period_from_columns(row.year, row.month, row.week)?,
            ingredient: parse_ingredient(&row.ingredient)?,
            amount_delta: row.amount_delta,
            kind,
            created_at: row.created_at,
            user_id: row.user_id,
        })
    }
}

impl TransactionLog {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Append one adjustment inside the caller's transaction
    pub async fn append_in(&self, conn: &mut PgConnection, entry: NewTransaction) -> AppResult<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO inventory_transactions (
                business_id, year, month, week, ingredient, amount_delta, kind, created_at, user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(entry.business_id)
        .bind(entry.period.year)
        .bind(entry.period.month as i32)
        .bind(entry.period.week as i32)
        .bind(entry.ingredient.as_str())
        .bind(entry.amount_delta)
        .bind(entry.kind.as_str())
        .bind(entry.created_at)
        .bind(entry.user_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(id)
    }

    /// Adjustments within a week, month or year, newest first
    pub async fn list(
        &self,
        business_id: Uuid,
        scope: PeriodScope,
    ) -> AppResult<Vec<InventoryTransaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, business_id, year, month, week, ingredient, amount_delta, kind,
                   created_at, user_id
            FROM inventory_transactions
            WHERE business_id = $1 AND year = $2
              AND ($3::INT IS NULL OR month = $3)
              AND ($4::INT IS NULL OR week = $4)
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(business_id)
        .bind(scope.year())
        .bind(scope.month().map(|m| m as i32))
        .bind(scope.week().map(|w| w as i32))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(InventoryTransaction::try_from).collect()
    }
}
