//! Stock arithmetic and low-stock classification

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::RecipeCatalog;
use crate::consumption::Consumption;
use crate::types::Ingredient;

/// Current amount per ingredient for one period (or an aggregate of periods)
pub type StockLevels = BTreeMap<Ingredient, i64>;

/// An ingredient the ledger cannot cover
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deficit {
    pub ingredient: Ingredient,
    pub available: i64,
    pub needed: i64,
}

impl fmt::Display for Deficit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Insufficient {}: need {} units, only {} available",
            self.ingredient, self.needed, self.available
        )
    }
}

/// One deficit per ingredient whose level is below what `consumption` needs.
///
/// Unseeded ingredients count as zero.
pub fn check_sufficiency(consumption: &Consumption, levels: &StockLevels) -> Vec<Deficit> {
    consumption
        .iter()
        .filter_map(|(ingredient, needed)| {
            let available = levels.get(&ingredient).copied().unwrap_or(0);
            (available < needed).then_some(Deficit {
                ingredient,
                available,
                needed,
            })
        })
        .collect()
}

/// Subtract `consumption` from `levels`. Amounts may go negative.
pub fn apply_debit(levels: &mut StockLevels, consumption: &Consumption) {
    for (ingredient, used) in consumption.iter() {
        let level = levels.entry(ingredient).or_insert(0);
        *level = level.saturating_sub(used);
    }
}

/// Post-debit state of one ingredient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Ok,
    Low,
    Depleted,
}

/// Classify a remaining amount against a low-stock threshold
pub fn classify_level(remaining: i64, threshold: i64) -> StockStatus {
    if remaining < 0 {
        StockStatus::Depleted
    } else if remaining < threshold {
        StockStatus::Low
    } else {
        StockStatus::Ok
    }
}

/// A non-ok ingredient after a debit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlert {
    pub ingredient: Ingredient,
    pub remaining: i64,
    pub status: StockStatus,
}

impl fmt::Display for StockAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            StockStatus::Depleted => write!(
                f,
                "{} is depleted! ({} units)",
                self.ingredient, self.remaining
            ),
            StockStatus::Low => write!(
                f,
                "{} is running low ({} units left)",
                self.ingredient, self.remaining
            ),
            StockStatus::Ok => write!(f, "{} is ok ({} units)", self.ingredient, self.remaining),
        }
    }
}

/// Low-stock policy over the acting user's recipe catalog
pub struct LowStockDetector<'a> {
    catalog: &'a RecipeCatalog,
}

impl<'a> LowStockDetector<'a> {
    pub fn new(catalog: &'a RecipeCatalog) -> Self {
        Self { catalog }
    }

    pub fn threshold(&self, ingredient: Ingredient) -> i64 {
        self.catalog.threshold(ingredient)
    }

    pub fn classify(&self, ingredient: Ingredient, remaining: i64) -> StockStatus {
        classify_level(remaining, self.threshold(ingredient))
    }

    /// Alerts for every non-ok ingredient touched by `consumption`, in its order
    pub fn alerts(&self, consumption: &Consumption, levels: &StockLevels) -> Vec<StockAlert> {
        consumption
            .ingredients()
            .filter_map(|ingredient| {
                let remaining = levels.get(&ingredient).copied().unwrap_or(0);
                match self.classify(ingredient, remaining) {
                    StockStatus::Ok => None,
                    status => Some(StockAlert {
                        ingredient,
                        remaining,
                        status,
                    }),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{default_recipes, initial_levels};

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify_level(-1, 500), StockStatus::Depleted);
        assert_eq!(classify_level(0, 500), StockStatus::Low);
        assert_eq!(classify_level(499, 500), StockStatus::Low);
        assert_eq!(classify_level(500, 500), StockStatus::Ok);
        // zero threshold: nothing is ever low
        assert_eq!(classify_level(0, 0), StockStatus::Ok);
    }

    #[test]
    fn test_sufficiency_reports_each_short_ingredient() {
        let levels = initial_levels();
        let consumption: Consumption = [
            (Ingredient::Flour, 10_000),
            (Ingredient::Eggs, 51),
            (Ingredient::Chocolate, 1001),
        ]
        .into_iter()
        .collect();

        let deficits = check_sufficiency(&consumption, &levels);
        let short: Vec<_> = deficits.iter().map(|d| d.ingredient).collect();
        assert_eq!(short, vec![Ingredient::Eggs, Ingredient::Chocolate]);
        assert_eq!(
            deficits[0].to_string(),
            "Insufficient eggs: need 51 units, only 50 available"
        );
    }

    #[test]
    fn test_debit_leaves_others_unchanged() {
        let mut levels = initial_levels();
        let consumption: Consumption = [(Ingredient::Yeast, 20)].into_iter().collect();
        apply_debit(&mut levels, &consumption);
        assert_eq!(levels[&Ingredient::Yeast], 180);
        assert_eq!(levels[&Ingredient::Flour], 10_000);
    }

    #[test]
    fn test_alerts_follow_consumption_order() {
        let catalog: RecipeCatalog = default_recipes().into_iter().collect();
        let detector = LowStockDetector::new(&catalog);
        let mut levels = initial_levels();
        levels.insert(Ingredient::Chocolate, -50);
        levels.insert(Ingredient::Sugar, 10);

        let consumption: Consumption = [(Ingredient::Chocolate, 90), (Ingredient::Sugar, 5)]
            .into_iter()
            .collect();
        let alerts: Vec<String> = detector
            .alerts(&consumption, &levels)
            .iter()
            .map(ToString::to_string)
            .collect();

        assert_eq!(
            alerts,
            vec![
                "chocolate is depleted! (-50 units)".to_string(),
                "sugar is running low (10 units left)".to_string(),
            ]
        );
    }
}
