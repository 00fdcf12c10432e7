//! Consumption engine tests
//!
//! Tests for converting sales reports into ingredient usage:
//! - Consumption formula over the recipe catalog
//! - Unknown items and non-positive quantities
//! - Ingredient order of the result

use proptest::prelude::*;
use shared::{
    compute_consumption, default_recipes, Ingredient, IngredientQuantities, RecipeCatalog,
    SalesQuantities,
};

fn default_catalog() -> RecipeCatalog {
    default_recipes().into_iter().collect()
}

fn sales(items: &[(&str, i64)]) -> SalesQuantities {
    items.iter().map(|(n, q)| (n.to_string(), *q)).collect()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Two loaves of bread
    #[test]
    fn test_bread_sale_consumption() {
        let consumption = compute_consumption(&sales(&[("Bread", 2)]), &default_catalog()).unwrap();

        assert_eq!(consumption.get(Ingredient::Flour), 1000);
        assert_eq!(consumption.get(Ingredient::Water), 600);
        assert_eq!(consumption.get(Ingredient::Yeast), 20);
        assert_eq!(consumption.get(Ingredient::Salt), 20);
        assert_eq!(consumption.len(), 4);
    }

    /// Shared ingredients accumulate across products
    #[test]
    fn test_mixed_sale_accumulates() {
        let consumption = compute_consumption(
            &sales(&[("Bread", 1), ("Cake", 2), ("Cookies", 3)]),
            &default_catalog(),
        )
        .unwrap();

        // 500 + 2*300 + 3*200
        assert_eq!(consumption.get(Ingredient::Flour), 1700);
        // 2*200 + 3*100
        assert_eq!(consumption.get(Ingredient::Sugar), 700);
        // 2*150 + 3*100
        assert_eq!(consumption.get(Ingredient::Butter), 600);
        assert_eq!(consumption.get(Ingredient::Chocolate), 150);
    }

    /// Unknown products are skipped silently
    #[test]
    fn test_unknown_item_skipped() {
        let consumption =
            compute_consumption(&sales(&[("Croissant", 10), ("Bread", 1)]), &default_catalog())
                .unwrap();
        assert_eq!(consumption.get(Ingredient::Flour), 500);
        assert_eq!(consumption.len(), 4);
    }

    /// Zero and negative quantities contribute nothing
    #[test]
    fn test_non_positive_quantities_skipped() {
        let consumption =
            compute_consumption(&sales(&[("Bread", 0), ("Cake", -4)]), &default_catalog()).unwrap();
        assert!(consumption.is_empty());
    }

    /// Ingredients appear in the order they are first touched
    #[test]
    fn test_consumption_order() {
        // Items are processed by name: Bread, then Cookies
        let consumption =
            compute_consumption(&sales(&[("Cookies", 1), ("Bread", 1)]), &default_catalog())
                .unwrap();
        let order: Vec<Ingredient> = consumption.ingredients().collect();

        assert_eq!(
            order,
            vec![
                Ingredient::Flour,
                Ingredient::Water,
                Ingredient::Yeast,
                Ingredient::Salt,
                Ingredient::Sugar,
                Ingredient::Butter,
                Ingredient::Chocolate,
            ]
        );
    }

    /// A recipe with all-zero quantities touches nothing
    #[test]
    fn test_empty_recipe() {
        let catalog: RecipeCatalog = vec![("Water Glass", IngredientQuantities::default())]
            .into_iter()
            .collect();
        let consumption = compute_consumption(&sales(&[("Water Glass", 3)]), &catalog).unwrap();
        assert!(consumption.is_empty());
    }

    /// Serialized consumption keeps its order
    #[test]
    fn test_consumption_serializes_as_ordered_map() {
        let consumption = compute_consumption(&sales(&[("Cake", 1)]), &default_catalog()).unwrap();
        let json = serde_json::to_string(&consumption).unwrap();
        assert_eq!(json, r#"{"flour":300,"sugar":200,"eggs":3,"butter":150}"#);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for recipe quantities (zero allowed)
    fn quantities_strategy() -> impl Strategy<Value = IngredientQuantities> {
        prop::collection::vec(0i64..=1000, 8).prop_map(|amounts| {
            Ingredient::ALL.into_iter().zip(amounts).collect()
        })
    }

    /// Strategy for a small catalog of named recipes
    fn catalog_strategy() -> impl Strategy<Value = RecipeCatalog> {
        prop::collection::btree_map("[A-E]", quantities_strategy(), 0..5)
            .prop_map(|recipes| recipes.into_iter().collect())
    }

    /// Strategy for a sales report, including unknown names and non-positive lines
    fn sales_strategy() -> impl Strategy<Value = SalesQuantities> {
        prop::collection::btree_map("[A-G]", -5i64..=50, 0..7)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Every ingredient total equals the sum of quantity * recipe amount
        #[test]
        fn prop_consumption_formula(
            catalog in catalog_strategy(),
            sales in sales_strategy()
        ) {
            let consumption = compute_consumption(&sales, &catalog).unwrap();

            for ingredient in Ingredient::ALL {
                let expected: i64 = sales
                    .iter()
                    .filter(|(_, &q)| q > 0)
                    .filter_map(|(item, &q)| catalog.get(item).map(|r| q * r.get(ingredient)))
                    .sum();
                prop_assert_eq!(consumption.get(ingredient), expected);
            }
        }

        /// Ingredients with a zero total are omitted
        #[test]
        fn prop_no_zero_entries(
            catalog in catalog_strategy(),
            sales in sales_strategy()
        ) {
            let consumption = compute_consumption(&sales, &catalog).unwrap();
            for (_, amount) in consumption.iter() {
                prop_assert!(amount > 0);
            }
        }

        /// Items missing from the catalog never change the result
        #[test]
        fn prop_unknown_items_ignored(
            catalog in catalog_strategy(),
            sales in sales_strategy(),
            extra in 1i64..100
        ) {
            let mut with_unknown = sales.clone();
            with_unknown.insert("Unlisted Pastry".to_string(), extra);

            prop_assert_eq!(
                compute_consumption(&sales, &catalog).unwrap(),
                compute_consumption(&with_unknown, &catalog).unwrap()
            );
        }
    }
}
