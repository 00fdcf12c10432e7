//! Inventory ledger service
//!
//! Stock rows are keyed by (business, year, month, week, ingredient). Every
//! write runs inside one database transaction that holds both the in-process
//! lock for its (business, period) key and a transaction-scoped advisory lock
//! on the same key, so the read-check-debit sequence of a sale cannot
//! interleave with another writer of that period.

use chrono::Utc;
use serde::Serialize;
use shared::{
    check_sufficiency, compute_consumption, validate_stock_amount, Consumption, Deficit,
    Ingredient, InventoryTransaction, LowStockDetector, OpeningClosing, Period, PeriodScope,
    PeriodType, RecipeCatalog, SaleReport, SalesQuantities, StockLevels, StockStatus,
    TransactionKind,
};
use sqlx::{FromRow, PgConnection, PgPool, Postgres, Transaction};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::period_lock::{LedgerKey, PeriodLocks};
use crate::services::sales::SalesService;
use crate::services::snapshot::{parse_ingredient, period_from_columns, SnapshotStore};
use crate::services::transaction_log::{NewTransaction, TransactionLog};

/// Inventory ledger for one database
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
    locks: PeriodLocks,
    snapshots: SnapshotStore,
    log: TransactionLog,
    sales: SalesService,
}

/// Result of a manual stock override
#[derive(Debug, Clone, Serialize)]
pub struct StockAdjustment {
    #[serde(flatten)]
    pub period: Period,
    pub ingredient: Ingredient,
    pub previous_amount: i64,
    pub new_amount: i64,
    pub delta: i64,
    /// Whether the change was appended to the transaction log
    pub logged: bool,
}

/// Dry run of a sale against the current ledger
#[derive(Debug, Clone, Serialize)]
pub struct SalePreview {
    pub period: Period,
    pub ingredients_needed: Consumption,
    pub sufficient: bool,
    pub deficits: Vec<String>,
}

/// Row for level queries
#[derive(Debug, FromRow)]
struct LevelRow {
    ingredient: String,
    amount: i64,
}

/// Row for known period queries
#[derive(Debug, FromRow)]
struct PeriodRow {
    year: i32,
    month: i32,
    week: i32,
}

/// Both locks for one ledger key plus the transaction they protect.
///
/// Fields drop in order, so the transaction rolls back before the
/// in-process lock is released.
struct LedgerWrite {
    tx: Transaction<'static, Postgres>,
    _guard: OwnedMutexGuard<()>,
}

impl InventoryService {
    pub fn new(db: PgPool, locks: PeriodLocks) -> Self {
        Self {
            snapshots: SnapshotStore::new(db.clone()),
            log: TransactionLog::new(db.clone()),
            sales: SalesService::new(db.clone()),
            db,
            locks,
        }
    }

    async fn begin_write(&self, key: LedgerKey) -> AppResult<LedgerWrite> {
        let guard = self.locks.lock(key).await;
        let mut tx = self.db.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(key.advisory_name())
            .execute(&mut *tx)
            .await?;

        Ok(LedgerWrite { tx, _guard: guard })
    }

    // ------------------------------------------------------------------------
    // Population and reads
    // ------------------------------------------------------------------------

    /// Seed a period from the initial inventory unless it already has rows.
    ///
    /// Returns true when rows were inserted. The opening snapshot is recorded
    /// only on first population.
    pub async fn populate(&self, business_id: Uuid, period: Period) -> AppResult<bool> {
        let mut write = self.begin_write(LedgerKey::new(business_id, period)).await?;
        let populated = self.populate_in(&mut write.tx, business_id, period).await?;
        write.tx.commit().await?;
        Ok(populated)
    }

    async fn populate_in(
        &self,
        conn: &mut PgConnection,
        business_id: Uuid,
        period: Period,
    ) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM inventory
                WHERE business_id = $1 AND year = $2 AND month = $3 AND week = $4
            )
            "#,
        )
        .bind(business_id)
        .bind(period.year)
        .bind(period.month as i32)
        .bind(period.week as i32)
        .fetch_one(&mut *conn)
        .await?;

        if exists {
            return Ok(false);
        }

        Self::seed_in(conn, business_id, period).await?;
        let levels = Self::period_levels_in(conn, business_id, period).await?;
        self.snapshots
            .record_opening_in(conn, business_id, period, &levels)
            .await?;

        debug!("Populated inventory for business {} period {}", business_id, period);
        Ok(true)
    }

    async fn seed_in(conn: &mut PgConnection, business_id: Uuid, period: Period) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO inventory (business_id, year, month, week, ingredient, amount)
            SELECT $1, $2, $3, $4, ingredient, amount
            FROM initial_inventory
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(business_id)
        .bind(period.year)
        .bind(period.month as i32)
        .bind(period.week as i32)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    async fn period_levels_in(
        conn: &mut PgConnection,
        business_id: Uuid,
        period: Period,
    ) -> AppResult<StockLevels> {
        let rows = sqlx::query_as::<_, LevelRow>(
            r#"
            SELECT ingredient, amount
            FROM inventory
            WHERE business_id = $1 AND year = $2 AND month = $3 AND week = $4
            "#,
        )
        .bind(business_id)
        .bind(period.year)
        .bind(period.month as i32)
        .bind(period.week as i32)
        .fetch_all(&mut *conn)
        .await?;

        levels_from_rows(rows)
    }

    /// Stock for one week, summed over a month, or summed over a year.
    ///
    /// Unseeded periods yield empty levels.
    pub async fn levels(&self, business_id: Uuid, scope: PeriodScope) -> AppResult<StockLevels> {
        let rows = sqlx::query_as::<_, LevelRow>(
            r#"
            SELECT ingredient, SUM(amount)::BIGINT AS amount
            FROM inventory
            WHERE business_id = $1 AND year = $2
              AND ($3::INT IS NULL OR month = $3)
              AND ($4::INT IS NULL OR week = $4)
            GROUP BY ingredient
            "#,
        )
        .bind(business_id)
        .bind(scope.year())
        .bind(scope.month().map(|m| m as i32))
        .bind(scope.week().map(|w| w as i32))
        .fetch_all(&self.db)
        .await?;

        levels_from_rows(rows)
    }

    /// Deficits the given consumption would cause in one period
    pub async fn check_sufficiency(
        &self,
        business_id: Uuid,
        period: Period,
        consumption: &Consumption,
    ) -> AppResult<Vec<Deficit>> {
        let levels = self.levels(business_id, PeriodScope::Week(period)).await?;
        Ok(check_sufficiency(consumption, &levels))
    }

    /// Compute what a sale would consume and whether the period covers it.
    ///
    /// Populates the period first so a fresh week is checked against the seed.
    pub async fn preview_sale(
        &self,
        business_id: Uuid,
        period: Period,
        sales: &SalesQuantities,
        catalog: &RecipeCatalog,
    ) -> AppResult<SalePreview> {
        let consumption = compute_consumption(sales, catalog)?;
        self.populate(business_id, period).await?;
        let deficits = self
            .check_sufficiency(business_id, period, &consumption)
            .await?;

        Ok(SalePreview {
            period,
            sufficient: deficits.is_empty(),
            deficits: deficits.iter().map(ToString::to_string).collect(),
            ingredients_needed: consumption,
        })
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    /// Add `delta` to one ingredient, creating the row at zero if missing
    async fn adjust_in(
        conn: &mut PgConnection,
        business_id: Uuid,
        period: Period,
        ingredient: Ingredient,
        delta: i64,
    ) -> AppResult<i64> {
        let amount = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO inventory (business_id, year, month, week, ingredient, amount)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (business_id, year, month, week, ingredient)
            DO UPDATE SET amount = inventory.amount + EXCLUDED.amount, updated_at = NOW()
            RETURNING amount
            "#,
        )
        .bind(business_id)
        .bind(period.year)
        .bind(period.month as i32)
        .bind(period.week as i32)
        .bind(ingredient.as_str())
        .bind(delta)
        .fetch_one(&mut *conn)
        .await?;

        Ok(amount)
    }

    /// Apply a sales report to one period.
    ///
    /// Consumption is checked against the period's stock first. With
    /// `reject_insufficient` any deficit aborts the sale and nothing is
    /// written; otherwise the debit goes through and may leave negative
    /// amounts, which surface as depletion alerts.
    pub async fn record_sale(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        period: Period,
        sales: &SalesQuantities,
        catalog: &RecipeCatalog,
        reject_insufficient: bool,
    ) -> AppResult<SaleReport> {
        let consumption = compute_consumption(sales, catalog)?;

        let mut write = self.begin_write(LedgerKey::new(business_id, period)).await?;
        self.populate_in(&mut write.tx, business_id, period).await?;

        let levels = Self::period_levels_in(&mut write.tx, business_id, period).await?;
        let deficits: Vec<String> = check_sufficiency(&consumption, &levels)
            .iter()
            .map(ToString::to_string)
            .collect();

        if reject_insufficient && !deficits.is_empty() {
            warn!(
                "Rejected sale for business {} period {}: {}",
                business_id,
                period,
                deficits.join("; ")
            );
            return Err(AppError::InsufficientStock { deficits });
        }

        let now = Utc::now();
        for (ingredient, used) in consumption.iter() {
            Self::adjust_in(&mut write.tx, business_id, period, ingredient, -used).await?;
            self.log
                .append_in(
                    &mut write.tx,
                    NewTransaction {
                        business_id,
                        period,
                        ingredient,
                        amount_delta: -used,
                        kind: TransactionKind::Sale,
                        created_at: now,
                        user_id,
                    },
                )
                .await?;
        }

        let remaining = Self::period_levels_in(&mut write.tx, business_id, period).await?;
        let alerts = LowStockDetector::new(catalog).alerts(&consumption, &remaining);
        for alert in alerts.iter().filter(|a| a.status == StockStatus::Depleted) {
            warn!("Business {} period {}: {}", business_id, period, alert);
        }

        self.snapshots
            .record_closing_in(&mut write.tx, business_id, period, &remaining)
            .await?;
        self.sales
            .log_sales_in(&mut write.tx, user_id, period.year, sales, now.date_naive())
            .await?;

        write.tx.commit().await?;

        info!(
            "Recorded sale for business {} period {}: {} ingredients debited, {} alerts",
            business_id,
            period,
            consumption.len(),
            alerts.len()
        );

        Ok(SaleReport {
            period,
            ingredients_used: consumption,
            remaining,
            alerts: alerts.iter().map(ToString::to_string).collect(),
            deficits,
        })
    }

    /// Override one ingredient's amount.
    ///
    /// Only increases are appended to the transaction log; a decrease is
    /// written to the ledger and the closing snapshot but leaves no log entry.
    pub async fn set_amount(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        period: Period,
        ingredient: Ingredient,
        new_amount: i64,
    ) -> AppResult<StockAdjustment> {
        validate_stock_amount(new_amount).map_err(|msg| AppError::validation("amount", msg))?;

        let mut write = self.begin_write(LedgerKey::new(business_id, period)).await?;
        self.populate_in(&mut write.tx, business_id, period).await?;

        let previous_amount = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT amount FROM inventory
            WHERE business_id = $1 AND year = $2 AND month = $3 AND week = $4 AND ingredient = $5
            "#,
        )
        .bind(business_id)
        .bind(period.year)
        .bind(period.month as i32)
        .bind(period.week as i32)
        .bind(ingredient.as_str())
        .fetch_optional(&mut *write.tx)
        .await?
        .unwrap_or(0);

        let delta = new_amount
            .checked_sub(previous_amount)
            .ok_or_else(|| AppError::validation("amount", "Amount change is out of range"))?;
        Self::adjust_in(&mut write.tx, business_id, period, ingredient, delta).await?;

        let logged = delta > 0;
        if logged {
            self.log
                .append_in(
                    &mut write.tx,
                    NewTransaction {
                        business_id,
                        period,
                        ingredient,
                        amount_delta: delta,
                        kind: TransactionKind::ManualAdjustment,
                        created_at: Utc::now(),
                        user_id,
                    },
                )
                .await?;
        } else if delta < 0 {
            warn!(
                "Manual decrease of {} by {} for business {} period {} is not logged",
                ingredient, -delta, business_id, period
            );
        }

        let levels = Self::period_levels_in(&mut write.tx, business_id, period).await?;
        self.snapshots
            .record_closing_in(&mut write.tx, business_id, period, &levels)
            .await?;

        write.tx.commit().await?;

        info!(
            "Set {} to {} (was {}) for business {} period {}",
            ingredient, new_amount, previous_amount, business_id, period
        );

        Ok(StockAdjustment {
            period,
            ingredient,
            previous_amount,
            new_amount,
            delta,
            logged,
        })
    }

    /// Restore a period to the initial inventory.
    ///
    /// Logs the full seed amount per ingredient and rewrites both snapshots.
    pub async fn reset(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        period: Period,
    ) -> AppResult<StockLevels> {
        let mut write = self.begin_write(LedgerKey::new(business_id, period)).await?;

        sqlx::query(
            r#"
            DELETE FROM inventory
            WHERE business_id = $1 AND year = $2 AND month = $3 AND week = $4
            "#,
        )
        .bind(business_id)
        .bind(period.year)
        .bind(period.month as i32)
        .bind(period.week as i32)
        .execute(&mut *write.tx)
        .await?;

        Self::seed_in(&mut write.tx, business_id, period).await?;
        let levels = Self::period_levels_in(&mut write.tx, business_id, period).await?;

        let now = Utc::now();
        for (&ingredient, &amount) in &levels {
            self.log
                .append_in(
                    &mut write.tx,
                    NewTransaction {
                        business_id,
                        period,
                        ingredient,
                        amount_delta: amount,
                        kind: TransactionKind::Reset,
                        created_at: now,
                        user_id,
                    },
                )
                .await?;
        }

        self.snapshots
            .replace_opening_in(&mut write.tx, business_id, period, &levels)
            .await?;
        self.snapshots
            .record_closing_in(&mut write.tx, business_id, period, &levels)
            .await?;

        write.tx.commit().await?;

        info!("Reset inventory for business {} period {}", business_id, period);
        Ok(levels)
    }

    // ------------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------------

    pub async fn opening_closing(
        &self,
        business_id: Uuid,
        year: i32,
        period_type: PeriodType,
        period_value: Option<u32>,
    ) -> AppResult<OpeningClosing> {
        self.snapshots
            .opening_closing(business_id, year, period_type, period_value)
            .await
    }

    pub async fn transactions(
        &self,
        business_id: Uuid,
        scope: PeriodScope,
    ) -> AppResult<Vec<InventoryTransaction>> {
        self.log.list(business_id, scope).await
    }

    /// Periods that have ledger rows, newest first
    pub async fn known_periods(&self, business_id: Uuid) -> AppResult<Vec<Period>> {
        let rows = sqlx::query_as::<_, PeriodRow>(
            r#"
            SELECT DISTINCT year, month, week
            FROM inventory
            WHERE business_id = $1
            ORDER BY year DESC, month DESC, week DESC
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|r| period_from_columns(r.year, r.month, r.week))
            .collect()
    }
}

fn levels_from_rows(rows: Vec<LevelRow>) -> AppResult<StockLevels> {
    rows.into_iter()
        .map(|row| Ok((parse_ingredient(&row.ingredient)?, row.amount)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ingredient: &str, amount: i64) -> LevelRow {
        LevelRow {
            ingredient: ingredient.to_string(),
            amount,
        }
    }

    #[test]
    fn test_levels_from_rows() {
        let levels = levels_from_rows(vec![row("flour", 9_500), row("eggs", -3)]).unwrap();
        assert_eq!(levels[&Ingredient::Flour], 9_500);
        assert_eq!(levels[&Ingredient::Eggs], -3);
        assert_eq!(levels.len(), 2);
    }

    #[test]
    fn test_levels_from_rows_rejects_unknown_ingredient() {
        assert!(matches!(
            levels_from_rows(vec![row("saffron", 1)]),
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn test_stock_adjustment_serializes_flat_period() {
        let adjustment = StockAdjustment {
            period: Period::new(2024, 3, 10).unwrap(),
            ingredient: Ingredient::Sugar,
            previous_amount: 2_000,
            new_amount: 1_500,
            delta: -500,
            logged: false,
        };
        let json = serde_json::to_value(&adjustment).unwrap();
        assert_eq!(json["week"], 10);
        assert_eq!(json["ingredient"], "sugar");
        assert_eq!(json["logged"], false);
    }

    // ------------------------------------------------------------------------
    // Ledger writes against a migrated database
    // ------------------------------------------------------------------------

    use chrono::NaiveDate;
    use shared::{default_recipes, initial_levels, IngredientQuantities};

    const WEEK_10: Period = Period { year: 2024, month: 3, week: 10 };

    async fn seed_account(pool: &PgPool) -> (Uuid, Uuid) {
        let business_id: Uuid =
            sqlx::query_scalar("INSERT INTO businesses (name) VALUES ($1) RETURNING id")
                .bind("Corner Bakery")
                .fetch_one(pool)
                .await
                .unwrap();
        let user_id: Uuid = sqlx::query_scalar(
            "INSERT INTO users (business_id, username, password_hash, role) \
             VALUES ($1, 'owner', 'hash', 'admin') RETURNING id",
        )
        .bind(business_id)
        .fetch_one(pool)
        .await
        .unwrap();
        (business_id, user_id)
    }

    fn ledger(pool: &PgPool) -> InventoryService {
        InventoryService::new(pool.clone(), PeriodLocks::new())
    }

    fn catalog() -> RecipeCatalog {
        default_recipes().into_iter().collect()
    }

    fn sales(items: &[(&str, i64)]) -> SalesQuantities {
        items.iter().map(|(n, q)| (n.to_string(), *q)).collect()
    }

    async fn week_snapshots(
        service: &InventoryService,
        business_id: Uuid,
        period: Period,
    ) -> OpeningClosing {
        service
            .opening_closing(business_id, period.year, PeriodType::Week, Some(period.week))
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_opening_snapshot_is_written_once(pool: PgPool) {
        let (business_id, user_id) = seed_account(&pool).await;
        let service = ledger(&pool);

        assert!(service.populate(business_id, WEEK_10).await.unwrap());
        service
            .set_amount(business_id, user_id, WEEK_10, Ingredient::Flour, 12_000)
            .await
            .unwrap();
        assert!(!service.populate(business_id, WEEK_10).await.unwrap());

        // A second opening write for the same key is ignored
        let mut tx = pool.begin().await.unwrap();
        let mut other = initial_levels();
        other.insert(Ingredient::Flour, 1);
        service
            .snapshots
            .record_opening_in(&mut tx, business_id, WEEK_10, &other)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let snapshots = week_snapshots(&service, business_id, WEEK_10).await;
        assert_eq!(snapshots.opening, initial_levels());
        assert_eq!(snapshots.closing[&Ingredient::Flour], 12_000);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_sale_debits_and_records_closing(pool: PgPool) {
        let (business_id, user_id) = seed_account(&pool).await;
        let service = ledger(&pool);

        let report = service
            .record_sale(business_id, user_id, WEEK_10, &sales(&[("Bread", 2)]), &catalog(), true)
            .await
            .unwrap();
        assert_eq!(report.remaining[&Ingredient::Flour], 9_000);
        assert!(report.alerts.is_empty());

        let levels = service.levels(business_id, PeriodScope::Week(WEEK_10)).await.unwrap();
        assert_eq!(levels[&Ingredient::Flour], 9_000);
        assert_eq!(levels[&Ingredient::Water], 4_400);

        let snapshots = week_snapshots(&service, business_id, WEEK_10).await;
        assert_eq!(snapshots.opening[&Ingredient::Flour], 10_000);
        assert_eq!(snapshots.closing, levels);

        let log = service.transactions(business_id, PeriodScope::Week(WEEK_10)).await.unwrap();
        assert_eq!(log.len(), 4);
        assert!(log.iter().all(|t| t.kind == TransactionKind::Sale && t.amount_delta < 0));
        assert_eq!(
            log.iter().map(|t| t.amount_delta).sum::<i64>(),
            -(1_000 + 600 + 20 + 20)
        );

        let logged = SalesService::new(pool.clone()).list_sales(user_id, 2024).await.unwrap();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].quantity, 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_rejected_sale_writes_nothing(pool: PgPool) {
        let (business_id, user_id) = seed_account(&pool).await;
        let service = ledger(&pool);

        // 11 cakes need 2200 sugar; the seed holds 2000
        let err = service
            .record_sale(business_id, user_id, WEEK_10, &sales(&[("Cake", 11)]), &catalog(), true)
            .await
            .unwrap_err();
        match err {
            AppError::InsufficientStock { deficits } => {
                assert_eq!(
                    deficits,
                    vec!["Insufficient sugar: need 2200 units, only 2000 available"]
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }

        // Population happened inside the rolled back transaction too
        assert!(service.known_periods(business_id).await.unwrap().is_empty());
        assert!(service
            .transactions(business_id, PeriodScope::Week(WEEK_10))
            .await
            .unwrap()
            .is_empty());
        let snapshots = week_snapshots(&service, business_id, WEEK_10).await;
        assert!(snapshots.opening.is_empty() && snapshots.closing.is_empty());
        let logged = SalesService::new(pool.clone()).list_sales(user_id, 2024).await.unwrap();
        assert!(logged.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_unchecked_sale_goes_negative(pool: PgPool) {
        let (business_id, user_id) = seed_account(&pool).await;
        let service = ledger(&pool);

        let report = service
            .record_sale(business_id, user_id, WEEK_10, &sales(&[("Cake", 20)]), &catalog(), false)
            .await
            .unwrap();
        assert_eq!(report.remaining[&Ingredient::Eggs], -10);
        assert_eq!(report.remaining[&Ingredient::Sugar], -2_000);
        assert_eq!(report.deficits.len(), 2);
        assert!(report.alerts.contains(&"eggs is depleted! (-10 units)".to_string()));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_manual_decrease_is_not_logged(pool: PgPool) {
        let (business_id, user_id) = seed_account(&pool).await;
        let service = ledger(&pool);

        let lowered = service
            .set_amount(business_id, user_id, WEEK_10, Ingredient::Flour, 3_000)
            .await
            .unwrap();
        assert_eq!(lowered.previous_amount, 10_000);
        assert_eq!(lowered.delta, -7_000);
        assert!(!lowered.logged);
        assert!(service
            .transactions(business_id, PeriodScope::Week(WEEK_10))
            .await
            .unwrap()
            .is_empty());

        let raised = service
            .set_amount(business_id, user_id, WEEK_10, Ingredient::Flour, 3_500)
            .await
            .unwrap();
        assert!(raised.logged);

        let log = service.transactions(business_id, PeriodScope::Week(WEEK_10)).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].kind, TransactionKind::ManualAdjustment);
        assert_eq!(log[0].amount_delta, 500);

        let snapshots = week_snapshots(&service, business_id, WEEK_10).await;
        assert_eq!(snapshots.closing[&Ingredient::Flour], 3_500);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_reset_restores_seed(pool: PgPool) {
        let (business_id, user_id) = seed_account(&pool).await;
        let service = ledger(&pool);

        service
            .record_sale(business_id, user_id, WEEK_10, &sales(&[("Cookies", 3)]), &catalog(), true)
            .await
            .unwrap();
        service
            .set_amount(business_id, user_id, WEEK_10, Ingredient::Sugar, 10)
            .await
            .unwrap();

        let restored = service.reset(business_id, user_id, WEEK_10).await.unwrap();
        assert_eq!(restored, initial_levels());

        let levels = service.levels(business_id, PeriodScope::Week(WEEK_10)).await.unwrap();
        assert_eq!(levels, initial_levels());

        let snapshots = week_snapshots(&service, business_id, WEEK_10).await;
        assert_eq!(snapshots.opening, initial_levels());
        assert_eq!(snapshots.closing, initial_levels());

        let log = service.transactions(business_id, PeriodScope::Week(WEEK_10)).await.unwrap();
        let resets: StockLevels = log
            .iter()
            .filter(|t| t.kind == TransactionKind::Reset)
            .map(|t| (t.ingredient, t.amount_delta))
            .collect();
        assert_eq!(resets, initial_levels());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_concurrent_sales_from_separate_processes(pool: PgPool) {
        let (business_id, user_id) = seed_account(&pool).await;

        let mut loaf = IngredientQuantities::default();
        loaf.set(Ingredient::Flour, 6_000);
        let catalog: RecipeCatalog = [("Loaf", loaf)].into_iter().collect();
        let order = sales(&[("Loaf", 1)]);

        // Separate lock tables, so only the advisory lock serializes the two
        let first = ledger(&pool);
        let second = ledger(&pool);
        let (a, b) = tokio::join!(
            first.record_sale(business_id, user_id, WEEK_10, &order, &catalog, true),
            second.record_sale(business_id, user_id, WEEK_10, &order, &catalog, true),
        );

        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        let rejected = if a.is_ok() { b } else { a };
        assert!(matches!(rejected, Err(AppError::InsufficientStock { .. })));

        let levels = first.levels(business_id, PeriodScope::Week(WEEK_10)).await.unwrap();
        assert_eq!(levels[&Ingredient::Flour], 4_000);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_new_years_day_period_round_trips(pool: PgPool) {
        let (business_id, user_id) = seed_account(&pool).await;
        let service = ledger(&pool);
        let period = Period::containing(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());

        service
            .record_sale(business_id, user_id, period, &sales(&[("Bread", 1)]), &catalog(), true)
            .await
            .unwrap();

        assert_eq!(service.known_periods(business_id).await.unwrap(), vec![period]);
        let snapshots = week_snapshots(&service, business_id, period).await;
        assert_eq!(snapshots.period_start, NaiveDate::from_ymd_opt(2020, 12, 28));
        assert_eq!(snapshots.period_end, NaiveDate::from_ymd_opt(2021, 1, 3));
    }
}
