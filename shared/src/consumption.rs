//! Conversion of a sales report into ingredient consumption

use std::collections::BTreeMap;

use serde::ser::{Serialize, Serializer};

use crate::catalog::RecipeCatalog;
use crate::error::DomainError;
use crate::types::Ingredient;

/// Units sold per product name
pub type SalesQuantities = BTreeMap<String, i64>;

/// Total ingredient usage, in the order ingredients were first touched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Consumption {
    entries: Vec<(Ingredient, i64)>,
}

impl Consumption {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the running total for `ingredient`, saturating at the i64 bounds
    pub fn add(&mut self, ingredient: Ingredient, amount: i64) {
        match self.entries.iter_mut().find(|(i, _)| *i == ingredient) {
            Some((_, total)) => *total = total.saturating_add(amount),
            None => self.entries.push((ingredient, amount)),
        }
    }

    /// Add `amount` to the running total; `None` if the total would overflow
    pub fn checked_add(&mut self, ingredient: Ingredient, amount: i64) -> Option<()> {
        match self.entries.iter_mut().find(|(i, _)| *i == ingredient) {
            Some((_, total)) => *total = total.checked_add(amount)?,
            None => self.entries.push((ingredient, amount)),
        }
        Some(())
    }

    pub fn get(&self, ingredient: Ingredient) -> i64 {
        self.entries
            .iter()
            .find(|(i, _)| *i == ingredient)
            .map(|(_, amount)| *amount)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ingredient, i64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn ingredients(&self) -> impl Iterator<Item = Ingredient> + '_ {
        self.entries.iter().map(|(i, _)| *i)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Ingredient, i64)> for Consumption {
    fn from_iter<T: IntoIterator<Item = (Ingredient, i64)>>(iter: T) -> Self {
        let mut consumption = Consumption::new();
        for (ingredient, amount) in iter {
            consumption.add(ingredient, amount);
        }
        consumption
    }
}

impl Serialize for Consumption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(i, a)| (i, a)))
    }
}

/// Ingredients needed to produce the given sales.
///
/// Items missing from the catalog and non-positive quantities are skipped;
/// only ingredients with a positive recipe amount contribute. Totals that do
/// not fit in an i64 are rejected with `QuantityTooLarge`.
pub fn compute_consumption(
    sales: &SalesQuantities,
    catalog: &RecipeCatalog,
) -> Result<Consumption, DomainError> {
    let mut total = Consumption::new();
    for (item, &quantity) in sales {
        if quantity <= 0 {
            continue;
        }
        let Some(recipe) = catalog.get(item) else {
            continue;
        };
        for (ingredient, amount) in recipe.iter() {
            if amount > 0 {
                quantity
                    .checked_mul(amount)
                    .and_then(|used| total.checked_add(ingredient, used))
                    .ok_or_else(|| DomainError::QuantityTooLarge(item.clone()))?;
            }
        }
    }
    Ok(total)
}
