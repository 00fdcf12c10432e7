//! HTTP handlers for inventory ledger endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{
    max_week_in_calendar_year, validate_sales, Ingredient, InventoryTransaction, OpeningClosing,
    Period, PeriodScope, PeriodSelector, PeriodType, SaleReport, SalesQuantities, StockLevels,
};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::inventory::{SalePreview, StockAdjustment};
use crate::services::{InventoryService, RecipeService};
use crate::AppState;

/// A sales report for one period
#[derive(Debug, Deserialize)]
pub struct SaleInput {
    #[serde(flatten)]
    pub period: PeriodSelector,
    pub sales: SalesQuantities,
}

/// Manual override of one ingredient
#[derive(Debug, Deserialize)]
pub struct SetAmountInput {
    #[serde(flatten)]
    pub period: PeriodSelector,
    pub ingredient: Ingredient,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotQuery {
    pub year: Option<i32>,
    pub period_type: PeriodType,
    pub period_value: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct LevelsResponse {
    pub year: i32,
    pub month: Option<u32>,
    pub week: Option<u32>,
    pub levels: StockLevels,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub period: Period,
    pub levels: StockLevels,
}

fn ledger(state: &AppState) -> InventoryService {
    InventoryService::new(state.db.clone(), state.locks.clone())
}

/// Current stock for a week, or summed over a month or year
pub async fn get_levels(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(selector): Query<PeriodSelector>,
) -> AppResult<Json<LevelsResponse>> {
    let scope = selector.scope()?;
    let levels = ledger(&state)
        .levels(current_user.0.business_id, scope)
        .await?;

    Ok(Json(LevelsResponse {
        year: scope.year(),
        month: scope.month(),
        week: scope.week(),
        levels,
    }))
}

/// Periods that have ledger rows
pub async fn list_periods(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Period>>> {
    let periods = ledger(&state)
        .known_periods(current_user.0.business_id)
        .await?;
    Ok(Json(periods))
}

/// Check a sales report against the ledger without debiting
pub async fn check_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SaleInput>,
) -> AppResult<Json<SalePreview>> {
    let period = input.period.resolve()?;
    let catalog = RecipeService::new(state.db.clone())
        .catalog(current_user.0.user_id)
        .await?;

    let preview = ledger(&state)
        .preview_sale(current_user.0.business_id, period, &input.sales, &catalog)
        .await?;
    Ok(Json(preview))
}

/// Record a sales report and debit the ledger
pub async fn record_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SaleInput>,
) -> AppResult<Json<SaleReport>> {
    validate_sales(&input.sales).map_err(|msg| AppError::validation("sales", msg))?;
    let period = input.period.resolve()?;
    let catalog = RecipeService::new(state.db.clone())
        .catalog(current_user.0.user_id)
        .await?;

    let report = ledger(&state)
        .record_sale(
            current_user.0.business_id,
            current_user.0.user_id,
            period,
            &input.sales,
            &catalog,
            state.config.inventory.reject_insufficient_sales,
        )
        .await?;
    Ok(Json(report))
}

/// Override one ingredient's amount (admin only)
pub async fn set_amount(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SetAmountInput>,
) -> AppResult<Json<StockAdjustment>> {
    current_user.0.require_admin()?;
    let period = input.period.resolve()?;

    let adjustment = ledger(&state)
        .set_amount(
            current_user.0.business_id,
            current_user.0.user_id,
            period,
            input.ingredient,
            input.amount,
        )
        .await?;
    Ok(Json(adjustment))
}

/// Restore a period to the initial inventory (admin only)
pub async fn reset_period(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(selector): Json<PeriodSelector>,
) -> AppResult<Json<ResetResponse>> {
    current_user.0.require_admin()?;
    let period = selector.resolve()?;

    let levels = ledger(&state)
        .reset(current_user.0.business_id, current_user.0.user_id, period)
        .await?;
    Ok(Json(ResetResponse { period, levels }))
}

/// Opening and closing stock for a week, month or year
pub async fn get_snapshots(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<SnapshotQuery>,
) -> AppResult<Json<OpeningClosing>> {
    let year = query.year.unwrap_or_else(|| Period::current().year);
    validate_period_value(year, query.period_type, query.period_value)?;

    let result = ledger(&state)
        .opening_closing(
            current_user.0.business_id,
            year,
            query.period_type,
            query.period_value,
        )
        .await?;
    Ok(Json(result))
}

/// Adjustment history for a week, month or year, newest first
pub async fn list_transactions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(selector): Query<PeriodSelector>,
) -> AppResult<Json<Vec<InventoryTransaction>>> {
    let scope: PeriodScope = selector.scope()?;
    let transactions = ledger(&state)
        .transactions(current_user.0.business_id, scope)
        .await?;
    Ok(Json(transactions))
}

fn validate_period_value(year: i32, period_type: PeriodType, value: Option<u32>) -> AppResult<()> {
    match (period_type, value) {
        (PeriodType::Year, _) => {
            PeriodSelector::new(year, None, None).scope()?;
        }
        (PeriodType::Month, Some(month)) => {
            PeriodSelector::new(year, Some(month), None).scope()?;
        }
        (PeriodType::Week, Some(week)) => {
            if week == 0 || week > max_week_in_calendar_year(year)? {
                return Err(shared::DomainError::InvalidWeek { year, week }.into());
            }
        }
        (_, None) => {
            return Err(AppError::validation(
                "period_value",
                format!("period_value is required for a {} query", period_type.as_str()),
            ))
        }
    }
    Ok(())
}
