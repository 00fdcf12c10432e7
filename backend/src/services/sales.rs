//! Sales log service

use chrono::NaiveDate;
use shared::{SaleRecord, SalesQuantities};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::AppResult;

/// Sales service for the append-only sales log
#[derive(Clone)]
pub struct SalesService {
    db: PgPool,
}

/// Row for sales queries
#[derive(Debug, FromRow)]
struct SaleRow {
    id: Uuid,
    user_id: Uuid,
    year: i32,
    item: String,
    quantity: i64,
    sale_date: NaiveDate,
}

impl From<SaleRow> for SaleRecord {
    fn from(row: SaleRow) -> Self {
        SaleRecord {
            id: row.id,
            user_id: row.user_id,
            year: row.year,
            item: row.item,
            quantity: row.quantity,
            date: row.sale_date,
        }
    }
}

impl SalesService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Append one row per positive sale line; returns how many were logged
    pub async fn log_sales_in(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        year: i32,
        sales: &SalesQuantities,
        date: NaiveDate,
    ) -> AppResult<usize> {
        let (items, quantities): (Vec<String>, Vec<i64>) = sales
            .iter()
            .filter(|(_, &quantity)| quantity > 0)
            .map(|(item, &quantity)| (item.clone(), quantity))
            .unzip();

        if items.is_empty() {
            return Ok(0);
        }

        sqlx::query(
            r#"
            INSERT INTO sales (user_id, year, item, quantity, sale_date)
            SELECT $1, $2, s.item, s.quantity, $3
            FROM UNNEST($4::TEXT[], $5::BIGINT[]) AS s(item, quantity)
            "#,
        )
        .bind(user_id)
        .bind(year)
        .bind(date)
        .bind(&items)
        .bind(&quantities)
        .execute(&mut *conn)
        .await?;

        Ok(items.len())
    }

    /// Sales recorded by a user for one year, newest first
    pub async fn list_sales(&self, user_id: Uuid, year: i32) -> AppResult<Vec<SaleRecord>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, user_id, year, item, quantity, sale_date
            FROM sales
            WHERE user_id = $1 AND year = $2
            ORDER BY sale_date DESC, created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(year)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(SaleRecord::from).collect())
    }
}
