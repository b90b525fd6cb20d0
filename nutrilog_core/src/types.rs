//! Core domain types for the Nutrilog system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Nutrient quantities and per-meal totals
//! - Food catalogue entries
//! - Users, meals and the parsed webhook command

use crate::{Error, Result};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

// ============================================================================
// Nutrient Types
// ============================================================================

/// A nutrient amount stored in hundredths.
///
/// Sums are exact, so totals never depend on addition order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(i64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    /// Build from a decimal value, rounding to two places
    pub fn from_f64(value: f64) -> Self {
        Quantity((value * 100.0).round() as i64)
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, other: Quantity) -> Quantity {
        Quantity(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_f64())
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Quantity::from_f64)
    }
}

/// Calories, protein, carbohydrate and fiber for a food, meal or day
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutrientTotals {
    pub calories: Quantity,
    pub protein: Quantity,
    pub carbs: Quantity,
    pub fiber: Quantity,
}

impl NutrientTotals {
    /// Additive identity
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn new(calories: f64, protein: f64, carbs: f64, fiber: f64) -> Self {
        Self {
            calories: Quantity::from_f64(calories),
            protein: Quantity::from_f64(protein),
            carbs: Quantity::from_f64(carbs),
            fiber: Quantity::from_f64(fiber),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// True if any component is below zero
    pub fn has_negative(&self) -> bool {
        [self.calories, self.protein, self.carbs, self.fiber]
            .iter()
            .any(|q| q.is_negative())
    }
}

impl Add for NutrientTotals {
    type Output = NutrientTotals;

    fn add(self, other: NutrientTotals) -> NutrientTotals {
        NutrientTotals {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fiber: self.fiber + other.fiber,
        }
    }
}

impl AddAssign for NutrientTotals {
    fn add_assign(&mut self, other: NutrientTotals) {
        *self = *self + other;
    }
}

impl Sum for NutrientTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutrientTotals::zero(), |acc, n| acc + n)
    }
}

// ============================================================================
// Food Catalogue Types
// ============================================================================

/// Broad grouping of catalogue foods
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Grain,
    Protein,
    Dairy,
    Vegetable,
    Fruit,
    MixedDish,
}

/// A catalogue entry (nutrients per serving)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub category: FoodCategory,
    #[serde(flatten)]
    pub nutrients: NutrientTotals,
}

// ============================================================================
// User Types
// ============================================================================

/// Selects the Harris-Benedict branch
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(Error::Validation(format!(
                "unsupported gender value '{}': gender must be 'male' or 'female'",
                s
            ))),
        }
    }
}

/// Personal details supplied at registration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub name: String,
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub gender: Gender,
    pub goal: String,
}

/// A registered user. Never mutated after creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(flatten)]
    pub profile: UserProfile,
    pub bmr: f64,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Meal Types
// ============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            _ => Err(Error::Validation(
                "Invalid meal type. Must be breakfast, lunch, or dinner".into(),
            )),
        }
    }
}

/// A logged meal with its precomputed totals
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Meal {
    pub id: String,
    pub user_id: String,
    pub meal_type: MealType,
    /// Items exactly as logged, including ones missing from the catalogue
    pub food_items: Vec<String>,
    pub nutrients: NutrientTotals,
    pub logged_at: DateTime<Utc>,
}

impl Meal {
    /// Calendar date of the meal in the local timezone
    pub fn logged_on(&self) -> NaiveDate {
        self.logged_at.with_timezone(&Local).date_naive()
    }
}

/// Structured form of a webhook message such as `log lunch: rice, dal`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MealLogCommand {
    pub meal_type: MealType,
    pub food_items: Vec<String>,
}
