//! HTTP handlers for the sales log

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use shared::{Period, SaleRecord};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::SalesService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SalesQuery {
    pub year: Option<i32>,
}

/// List the caller's sales for a year (default: current year)
pub async fn list_sales(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<SalesQuery>,
) -> AppResult<Json<Vec<SaleRecord>>> {
    let year = query.year.unwrap_or_else(|| Period::current().year);
    let service = SalesService::new(state.db);
    let sales = service.list_sales(current_user.0.user_id, year).await?;
    Ok(Json(sales))
}
