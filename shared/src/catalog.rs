//! Recipe catalog for one user

use std::collections::BTreeMap;

use crate::models::Recipe;
use crate::types::{Ingredient, IngredientQuantities};

/// Mapping from product name to the ingredients one unit consumes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeCatalog {
    recipes: BTreeMap<String, IngredientQuantities>,
}

impl RecipeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, quantities: IngredientQuantities) {
        self.recipes.insert(name.into(), quantities);
    }

    pub fn get(&self, name: &str) -> Option<&IngredientQuantities> {
        self.recipes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.recipes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.recipes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IngredientQuantities)> {
        self.recipes.iter().map(|(name, q)| (name.as_str(), q))
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Largest single-batch requirement for `ingredient` across all recipes.
    ///
    /// Used as the low-stock cutoff. Zero when no recipe uses the ingredient.
    pub fn threshold(&self, ingredient: Ingredient) -> i64 {
        self.recipes
            .values()
            .map(|q| q.get(ingredient))
            .max()
            .unwrap_or(0)
    }
}

impl<'a> FromIterator<&'a Recipe> for RecipeCatalog {
    fn from_iter<T: IntoIterator<Item = &'a Recipe>>(iter: T) -> Self {
        let mut catalog = RecipeCatalog::new();
        for recipe in iter {
            catalog.insert(recipe.name.clone(), recipe.ingredients);
        }
        catalog
    }
}

impl<S: Into<String>> FromIterator<(S, IngredientQuantities)> for RecipeCatalog {
    fn from_iter<T: IntoIterator<Item = (S, IngredientQuantities)>>(iter: T) -> Self {
        let mut catalog = RecipeCatalog::new();
        for (name, quantities) in iter {
            catalog.insert(name, quantities);
        }
        catalog
    }
}
