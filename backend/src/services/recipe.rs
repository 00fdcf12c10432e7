//! Recipe catalog service

use chrono::{DateTime, Utc};
use shared::{
    default_recipes, validate_recipe_name, IngredientQuantities, Recipe, RecipeCatalog, RecipeInput,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Recipe service for per-user product recipes
#[derive(Clone)]
pub struct RecipeService {
    db: PgPool,
}

/// Row for recipe queries
#[derive(Debug, FromRow)]
struct RecipeRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    flour: i64,
    water: i64,
    yeast: i64,
    salt: i64,
    sugar: i64,
    eggs: i64,
    butter: i64,
    chocolate: i64,
    created_at: DateTime<Utc>,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Recipe {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            ingredients: IngredientQuantities {
                flour: row.flour,
                water: row.water,
                yeast: row.yeast,
                salt: row.salt,
                sugar: row.sugar,
                eggs: row.eggs,
                butter: row.butter,
                chocolate: row.chocolate,
            },
            created_at: row.created_at,
        }
    }
}

const RECIPE_COLUMNS: &str =
    "id, user_id, name, flour, water, yeast, salt, sugar, eggs, butter, chocolate, created_at";

impl RecipeService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All recipes owned by a user, by name
    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {} FROM recipes WHERE user_id = $1 ORDER BY name",
            RECIPE_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    /// The user's recipes as a name-keyed catalog
    pub async fn catalog(&self, user_id: Uuid) -> AppResult<RecipeCatalog> {
        let recipes = self.list(user_id).await?;
        Ok(recipes.iter().collect())
    }

    pub async fn get(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<Recipe> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {} FROM recipes WHERE id = $1 AND user_id = $2",
            RECIPE_COLUMNS
        ))
        .bind(recipe_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;

        Ok(row.into())
    }

    /// Create a recipe; the name must be unique for the user
    pub async fn create(&self, user_id: Uuid, input: RecipeInput) -> AppResult<Recipe> {
        let name = validate_input(&input)?;

        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            r#"
            INSERT INTO recipes (user_id, name, flour, water, yeast, salt, sugar, eggs, butter, chocolate)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            RECIPE_COLUMNS
        ))
        .bind(user_id)
        .bind(name)
        .bind(input.ingredients.flour)
        .bind(input.ingredients.water)
        .bind(input.ingredients.yeast)
        .bind(input.ingredients.salt)
        .bind(input.ingredients.sugar)
        .bind(input.ingredients.eggs)
        .bind(input.ingredients.butter)
        .bind(input.ingredients.chocolate)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "recipe name"))?;

        Ok(row.into())
    }

    /// Replace the name and quantities of an existing recipe
    pub async fn update(
        &self,
        user_id: Uuid,
        recipe_id: Uuid,
        input: RecipeInput,
    ) -> AppResult<Recipe> {
        let name = validate_input(&input)?;

        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            r#"
            UPDATE recipes
            SET name = $3, flour = $4, water = $5, yeast = $6, salt = $7,
                sugar = $8, eggs = $9, butter = $10, chocolate = $11
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            RECIPE_COLUMNS
        ))
        .bind(recipe_id)
        .bind(user_id)
        .bind(name)
        .bind(input.ingredients.flour)
        .bind(input.ingredients.water)
        .bind(input.ingredients.yeast)
        .bind(input.ingredients.salt)
        .bind(input.ingredients.sugar)
        .bind(input.ingredients.eggs)
        .bind(input.ingredients.butter)
        .bind(input.ingredients.chocolate)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "recipe name"))?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;

        Ok(row.into())
    }

    pub async fn delete(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(recipe_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Recipe".to_string()));
        }

        Ok(())
    }

    /// Give a user the starter recipes unless they already have some
    pub async fn seed_defaults_in(&self, conn: &mut PgConnection, user_id: Uuid) -> AppResult<usize> {
        let has_recipes = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM recipes WHERE user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        if has_recipes {
            return Ok(0);
        }

        let defaults = default_recipes();
        for (name, q) in &defaults {
            sqlx::query(
                r#"
                INSERT INTO recipes (user_id, name, flour, water, yeast, salt, sugar, eggs, butter, chocolate)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT ON CONSTRAINT recipes_user_name_key DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(*name)
            .bind(q.flour)
            .bind(q.water)
            .bind(q.yeast)
            .bind(q.salt)
            .bind(q.sugar)
            .bind(q.eggs)
            .bind(q.butter)
            .bind(q.chocolate)
            .execute(&mut *conn)
            .await?;
        }

        Ok(defaults.len())
    }
}

/// Validate a recipe input and return its trimmed name
fn validate_input(input: &RecipeInput) -> AppResult<&str> {
    input.validate()?;
    let name = input.name.trim();
    validate_recipe_name(name).map_err(|msg| AppError::validation("name", msg))?;
    Ok(name)
}
