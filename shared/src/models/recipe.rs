//! Recipe models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::types::IngredientQuantities;

/// A product recipe owned by one user; name is unique per user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub ingredients: IngredientQuantities,
    pub created_at: DateTime<Utc>,
}

/// Input for creating or updating a recipe
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecipeInput {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate]
    #[serde(default)]
    pub ingredients: IngredientQuantities,
}
