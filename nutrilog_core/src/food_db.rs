//! Default food catalogue and nutrient lookup.
//!
//! The database is built once and never mutated afterwards, so lookups
//! need no locking.

use crate::config::CustomFood;
use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cached default database - built once and shared by every caller
/// Ceiling for any single nutrient amount in one custom serving
pub const MAX_SERVING_AMOUNT: f64 = 10_000.0;

static DEFAULT_FOOD_DATABASE: Lazy<FoodDatabase> = Lazy::new(build_default_food_database);

/// Get a reference to the cached default database
pub fn get_default_food_database() -> &'static FoodDatabase {
    &DEFAULT_FOOD_DATABASE
}

/// Immutable map of normalized food name to catalogue entry
#[derive(Clone, Debug)]
pub struct FoodDatabase {
    foods: HashMap<String, FoodItem>,
}

/// Trim and lowercase a raw item as typed by a user
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl FoodDatabase {
    /// Build a database from catalogue entries. Later entries replace earlier
    /// ones with the same normalized name.
    pub fn from_items(items: impl IntoIterator<Item = FoodItem>) -> Self {
        let foods = items
            .into_iter()
            .map(|mut item| {
                item.name = normalize_name(&item.name);
                (item.name.clone(), item)
            })
            .collect();
        Self { foods }
    }

    /// Default catalogue extended with configured custom foods
    pub fn with_custom(custom: &[CustomFood]) -> Result<Self> {
        let mut items: Vec<FoodItem> = get_default_food_database()
            .foods
            .values()
            .cloned()
            .collect();

        for food in custom {
            let item = food.to_food_item();
            if normalize_name(&item.name).is_empty() {
                return Err(Error::Config("custom food has an empty name".into()));
            }
            for (nutrient, value) in food.nutrient_values() {
                if !value.is_finite() || !(0.0..=MAX_SERVING_AMOUNT).contains(&value) {
                    return Err(Error::Config(format!(
                        "custom food '{}': {} must be between 0 and {}, got {}",
                        item.name, nutrient, MAX_SERVING_AMOUNT, value
                    )));
                }
            }
            tracing::debug!("Adding custom food '{}'", item.name);
            items.push(item);
        }

        Ok(Self::from_items(items))
    }

    /// Nutrients for one serving of `name`, matched case-insensitively
    pub fn lookup(&self, name: &str) -> Option<NutrientTotals> {
        self.get(name).map(|item| item.nutrients)
    }

    /// Full catalogue entry for `name`
    pub fn get(&self, name: &str) -> Option<&FoodItem> {
        self.foods.get(&normalize_name(name))
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    /// All entries sorted by name
    pub fn items(&self) -> Vec<&FoodItem> {
        let mut items: Vec<_> = self.foods.values().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items
    }

    /// Validate the database for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (key, item) in &self.foods {
            if key.is_empty() || item.name.is_empty() {
                errors.push("Food has empty name".to_string());
            }
            if key != &item.name {
                errors.push(format!(
                    "Food key '{}' doesn't match food.name '{}'",
                    key, item.name
                ));
            }
            if key != &normalize_name(key) {
                errors.push(format!("Food key '{}' is not normalized", key));
            }
            if item.nutrients.has_negative() {
                errors.push(format!("Food '{}' has a negative nutrient value", key));
            }
        }

        errors
    }
}

fn food(
    name: &str,
    category: FoodCategory,
    calories: f64,
    protein: f64,
    carbs: f64,
    fiber: f64,
) -> FoodItem {
    FoodItem {
        name: name.into(),
        category,
        nutrients: NutrientTotals::new(calories, protein, carbs, fiber),
    }
}

/// Builds the seeded catalogue
///
/// **Note**: prefer `get_default_food_database()`, which returns the cached copy.
pub fn build_default_food_database() -> FoodDatabase {
    use FoodCategory::*;

    FoodDatabase::from_items([
        // Grains
        food("rice", Grain, 130.0, 2.7, 28.0, 0.4),
        food("bread", Grain, 265.0, 9.0, 49.0, 2.7),
        food("pasta", Grain, 131.0, 5.0, 25.0, 1.8),
        // Proteins
        food("dal", Protein, 116.0, 6.8, 20.0, 7.5),
        food("chicken", Protein, 165.0, 31.0, 0.0, 0.0),
        food("egg", Protein, 155.0, 13.0, 1.1, 0.0),
        food("fish", Protein, 84.0, 18.0, 0.0, 0.0),
        food("beef", Protein, 250.0, 26.0, 0.0, 0.0),
        // Dairy
        food("milk", Dairy, 42.0, 3.4, 5.0, 0.0),
        food("yogurt", Dairy, 59.0, 10.0, 3.6, 0.0),
        food("cheese", Dairy, 113.0, 7.0, 0.4, 0.0),
        // Vegetables
        food("cucumber", Vegetable, 16.0, 0.7, 3.6, 0.5),
        food("potato", Vegetable, 77.0, 2.0, 17.0, 2.2),
        food("tomato", Vegetable, 18.0, 0.9, 3.9, 1.2),
        food("onion", Vegetable, 40.0, 1.1, 9.3, 1.7),
        food("carrot", Vegetable, 41.0, 0.9, 10.0, 2.8),
        food("spinach", Vegetable, 23.0, 2.9, 3.6, 2.2),
        // Fruits
        food("banana", Fruit, 89.0, 1.1, 23.0, 2.6),
        food("apple", Fruit, 52.0, 0.3, 14.0, 2.4),
        // Mixed dishes
        food("salad", MixedDish, 20.0, 2.0, 4.0, 1.5),
    ])
}
