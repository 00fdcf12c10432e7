//! Common types used across the platform

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::DomainError;

/// Ingredients tracked by the ledger
///
/// The set is fixed; declaration order is the canonical display order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Ingredient {
    Flour,
    Water,
    Yeast,
    Salt,
    Sugar,
    Eggs,
    Butter,
    Chocolate,
}

impl Ingredient {
    pub const ALL: [Ingredient; 8] = [
        Ingredient::Flour,
        Ingredient::Water,
        Ingredient::Yeast,
        Ingredient::Salt,
        Ingredient::Sugar,
        Ingredient::Eggs,
        Ingredient::Butter,
        Ingredient::Chocolate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Ingredient::Flour => "flour",
            Ingredient::Water => "water",
            Ingredient::Yeast => "yeast",
            Ingredient::Salt => "salt",
            Ingredient::Sugar => "sugar",
            Ingredient::Eggs => "eggs",
            Ingredient::Butter => "butter",
            Ingredient::Chocolate => "chocolate",
        }
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Ingredient {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ingredient::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| DomainError::UnknownIngredient(s.to_string()))
    }
}

/// Per-ingredient quantities of one recipe batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct IngredientQuantities {
    #[validate(range(min = 0, max = 1_000_000))]
    pub flour: i64,
    #[validate(range(min = 0, max = 1_000_000))]
    pub water: i64,
    #[validate(range(min = 0, max = 1_000_000))]
    pub yeast: i64,
    #[validate(range(min = 0, max = 1_000_000))]
    pub salt: i64,
    #[validate(range(min = 0, max = 1_000_000))]
    pub sugar: i64,
    #[validate(range(min = 0, max = 1_000_000))]
    pub eggs: i64,
    #[validate(range(min = 0, max = 1_000_000))]
    pub butter: i64,
    #[validate(range(min = 0, max = 1_000_000))]
    pub chocolate: i64,
}

impl IngredientQuantities {
    pub fn get(&self, ingredient: Ingredient) -> i64 {
        match ingredient {
            Ingredient::Flour => self.flour,
            Ingredient::Water => self.water,
            Ingredient::Yeast => self.yeast,
            Ingredient::Salt => self.salt,
            Ingredient::Sugar => self.sugar,
            Ingredient::Eggs => self.eggs,
            Ingredient::Butter => self.butter,
            Ingredient::Chocolate => self.chocolate,
        }
    }

    pub fn set(&mut self, ingredient: Ingredient, amount: i64) {
        let slot = match ingredient {
            Ingredient::Flour => &mut self.flour,
            Ingredient::Water => &mut self.water,
            Ingredient::Yeast => &mut self.yeast,
            Ingredient::Salt => &mut self.salt,
            Ingredient::Sugar => &mut self.sugar,
            Ingredient::Eggs => &mut self.eggs,
            Ingredient::Butter => &mut self.butter,
            Ingredient::Chocolate => &mut self.chocolate,
        };
        *slot = amount;
    }

    /// Quantities in canonical ingredient order, zeros included
    pub fn iter(&self) -> impl Iterator<Item = (Ingredient, i64)> + '_ {
        Ingredient::ALL.into_iter().map(move |i| (i, self.get(i)))
    }
}

impl FromIterator<(Ingredient, i64)> for IngredientQuantities {
    fn from_iter<T: IntoIterator<Item = (Ingredient, i64)>>(iter: T) -> Self {
        let mut quantities = IngredientQuantities::default();
        for (ingredient, amount) in iter {
            quantities.set(ingredient, amount);
        }
        quantities
    }
}

/// Roles a user can hold within a business
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    Staff,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Staff => "staff",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(UserRole::Admin),
            "staff" => Some(UserRole::Staff),
            _ => None,
        }
    }
}
