//! Seed data: the fixed initial-inventory table and starter recipes

use crate::stock::StockLevels;
use crate::types::{Ingredient, IngredientQuantities};

/// Stock every new period starts from
pub const INITIAL_INVENTORY: [(Ingredient, i64); 8] = [
    (Ingredient::Flour, 10_000),
    (Ingredient::Water, 5_000),
    (Ingredient::Yeast, 200),
    (Ingredient::Salt, 200),
    (Ingredient::Sugar, 2_000),
    (Ingredient::Eggs, 50),
    (Ingredient::Butter, 3_000),
    (Ingredient::Chocolate, 1_000),
];

pub fn initial_levels() -> StockLevels {
    INITIAL_INVENTORY.into_iter().collect()
}

/// Recipes a user starts with when they have none
pub fn default_recipes() -> Vec<(&'static str, IngredientQuantities)> {
    vec![
        (
            "Bread",
            IngredientQuantities {
                flour: 500,
                water: 300,
                yeast: 10,
                salt: 10,
                ..Default::default()
            },
        ),
        (
            "Cake",
            IngredientQuantities {
                flour: 300,
                sugar: 200,
                eggs: 3,
                butter: 150,
                ..Default::default()
            },
        ),
        (
            "Cookies",
            IngredientQuantities {
                flour: 200,
                sugar: 100,
                butter: 100,
                chocolate: 50,
                ..Default::default()
            },
        ),
    ]
}
