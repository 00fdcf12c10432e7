//! WebAssembly module for the bakery inventory ledger
//!
//! Provides client-side computation for the sales form:
//! - Ingredient consumption preview
//! - Projected stock alerts before a sale is submitted
//! - ISO week boundaries for period pickers

use serde::Serialize;
use shared::{
    apply_debit, check_sufficiency, classify_level, compute_consumption, week_end, week_start,
    Consumption, IngredientQuantities, LowStockDetector, Period, RecipeCatalog, SalesQuantities,
    StockLevels, StockStatus,
};
use std::collections::BTreeMap;
use wasm_bindgen::prelude::*;

/// Projected outcome of a sale, computed without touching the ledger
#[derive(Debug, Serialize)]
struct SalePreview {
    ingredients_used: Consumption,
    remaining: StockLevels,
    deficits: Vec<String>,
    alerts: Vec<String>,
}

fn parse_catalog(recipes_json: &str) -> Result<RecipeCatalog, String> {
    let recipes: BTreeMap<String, IngredientQuantities> = serde_json::from_str(recipes_json)
        .map_err(|e| format!("Invalid recipes JSON: {}", e))?;
    Ok(recipes.into_iter().collect())
}

fn parse_sales(sales_json: &str) -> Result<SalesQuantities, String> {
    serde_json::from_str(sales_json).map_err(|e| format!("Invalid sales JSON: {}", e))
}

fn consumption_json(recipes_json: &str, sales_json: &str) -> Result<String, String> {
    let catalog = parse_catalog(recipes_json)?;
    let sales = parse_sales(sales_json)?;
    let consumption = compute_consumption(&sales, &catalog).map_err(|e| e.to_string())?;
    serde_json::to_string(&consumption).map_err(|e| e.to_string())
}

fn preview_json(recipes_json: &str, sales_json: &str, levels_json: &str) -> Result<String, String> {
    let catalog = parse_catalog(recipes_json)?;
    let sales = parse_sales(sales_json)?;
    let mut levels: StockLevels = serde_json::from_str(levels_json)
        .map_err(|e| format!("Invalid levels JSON: {}", e))?;

    let consumption = compute_consumption(&sales, &catalog).map_err(|e| e.to_string())?;
    let deficits = check_sufficiency(&consumption, &levels);
    apply_debit(&mut levels, &consumption);
    let alerts = LowStockDetector::new(&catalog).alerts(&consumption, &levels);

    let preview = SalePreview {
        deficits: deficits.iter().map(ToString::to_string).collect(),
        alerts: alerts.iter().map(ToString::to_string).collect(),
        ingredients_used: consumption,
        remaining: levels,
    };
    serde_json::to_string(&preview).map_err(|e| e.to_string())
}

fn status_name(status: StockStatus) -> &'static str {
    match status {
        StockStatus::Ok => "ok",
        StockStatus::Low => "low",
        StockStatus::Depleted => "depleted",
    }
}

/// Ingredient totals for a sales report.
///
/// `recipes_json` maps product names to ingredient quantities and
/// `sales_json` maps product names to units sold.
#[wasm_bindgen(js_name = computeConsumption)]
pub fn compute_consumption_js(recipes_json: &str, sales_json: &str) -> Result<String, JsValue> {
    consumption_json(recipes_json, sales_json).map_err(|e| JsValue::from_str(&e))
}

/// Consumption, deficits and post-sale alerts against the given levels
#[wasm_bindgen(js_name = previewSale)]
pub fn preview_sale(
    recipes_json: &str,
    sales_json: &str,
    levels_json: &str,
) -> Result<String, JsValue> {
    preview_json(recipes_json, sales_json, levels_json).map_err(|e| JsValue::from_str(&e))
}

/// "ok", "low" or "depleted"
#[wasm_bindgen(js_name = classifyStock)]
pub fn classify_stock(remaining: f64, threshold: f64) -> String {
    status_name(classify_level(remaining as i64, threshold as i64)).to_string()
}

/// Monday of an ISO week as YYYY-MM-DD
#[wasm_bindgen(js_name = weekStart)]
pub fn week_start_date(year: i32, week: u32) -> Result<String, JsValue> {
    week_start(year, week)
        .map(|d| d.to_string())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Sunday of an ISO week as YYYY-MM-DD
#[wasm_bindgen(js_name = weekEnd)]
pub fn week_end_date(year: i32, week: u32) -> Result<String, JsValue> {
    week_end(year, week)
        .map(|d| d.to_string())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The current (year, month, week) as JSON
#[wasm_bindgen(js_name = currentPeriod)]
pub fn current_period() -> String {
    serde_json::to_string(&Period::current()).unwrap_or_default()
}
