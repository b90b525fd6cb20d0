//! In-memory record store for users and meals.
//!
//! All state lives for the process lifetime only. Every mutation happens
//! under a single write lock; reads share a read lock.

use crate::aggregator::filter_by_date;
use crate::{Error, Meal, MealType, NutrientTotals, Result, User, UserProfile};
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Channel a meal arrived through; selects the identifier prefix
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MealOrigin {
    Direct,
    Webhook,
}

/// Everything needed to record a meal except its id and timestamp
#[derive(Clone, Debug)]
pub struct NewMeal {
    pub user_id: String,
    pub meal_type: MealType,
    pub food_items: Vec<String>,
    pub nutrients: NutrientTotals,
    pub origin: MealOrigin,
}

/// Repository of users and meals
pub trait RecordStore: Send + Sync {
    /// Create a user with a generated id
    fn create_user(&self, profile: UserProfile, bmr: f64) -> Result<User>;

    /// Return the user with `id`, creating it from `profile` if absent
    fn ensure_user(&self, id: &str, profile: UserProfile, bmr: f64) -> Result<User>;

    fn get_user(&self, id: &str) -> Option<User>;

    /// Record a meal at an explicit time. Fails with `NotFound` if the owner
    /// does not exist; nothing is mutated in that case.
    fn create_meal_at(&self, meal: NewMeal, logged_at: DateTime<Utc>) -> Result<Meal>;

    /// Record a meal logged now
    fn create_meal(&self, meal: NewMeal) -> Result<Meal> {
        self.create_meal_at(meal, Utc::now())
    }

    /// A user's meals in ascending logging order, optionally for one local date
    fn list_meals(&self, user_id: &str, date: Option<NaiveDate>) -> Result<Vec<Meal>>;

    fn user_count(&self) -> usize;

    fn meal_count(&self) -> usize;
}

#[derive(Debug, Default)]
struct Records {
    users: HashMap<String, User>,
    meals: HashMap<String, Meal>,
    meals_by_user: HashMap<String, Vec<String>>,
    user_seq: u64,
    meal_seq: u64,
}

impl Records {
    /// Next id for the given counter; callers advance it only once the insert succeeds
    fn candidate_id(prefix: &str, seq: u64, now: DateTime<Utc>) -> String {
        format!("{}_{}_{}", prefix, seq + 1, now.timestamp())
    }

    fn insert_user(&mut self, user: User) -> Result<User> {
        if self.users.contains_key(&user.id) {
            return Err(Error::Internal(format!(
                "identifier collision for user '{}'",
                user.id
            )));
        }
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }
}

/// `RecordStore` backed by hash maps behind one `RwLock`
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Records>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryStore {
    fn create_user(&self, profile: UserProfile, bmr: f64) -> Result<User> {
        let now = Utc::now();
        let mut records = self.records.write();

        let id = Records::candidate_id("user", records.user_seq, now);
        let user = records.insert_user(User {
            id,
            profile,
            bmr,
            created_at: now,
        })?;
        records.user_seq += 1;

        tracing::info!("Created user {}", user.id);
        Ok(user)
    }

    fn ensure_user(&self, id: &str, profile: UserProfile, bmr: f64) -> Result<User> {
        if let Some(user) = self.records.read().users.get(id) {
            return Ok(user.clone());
        }

        let mut records = self.records.write();
        // another writer may have created it between the two locks
        if let Some(user) = records.users.get(id) {
            return Ok(user.clone());
        }

        let user = records.insert_user(User {
            id: id.to_string(),
            profile,
            bmr,
            created_at: Utc::now(),
        })?;
        tracing::info!("Created default user {}", user.id);
        Ok(user)
    }

    fn get_user(&self, id: &str) -> Option<User> {
        self.records.read().users.get(id).cloned()
    }

    fn create_meal_at(&self, meal: NewMeal, logged_at: DateTime<Utc>) -> Result<Meal> {
        let mut records = self.records.write();

        if !records.users.contains_key(&meal.user_id) {
            return Err(Error::NotFound("User not found".into()));
        }

        let prefix = match meal.origin {
            MealOrigin::Direct => "meal",
            MealOrigin::Webhook => "webhook_meal",
        };
        let id = Records::candidate_id(prefix, records.meal_seq, Utc::now());
        if records.meals.contains_key(&id) {
            return Err(Error::Internal(format!(
                "identifier collision for meal '{}'",
                id
            )));
        }

        let meal = Meal {
            id,
            user_id: meal.user_id,
            meal_type: meal.meal_type,
            food_items: meal.food_items,
            nutrients: meal.nutrients,
            logged_at,
        };

        records.meal_seq += 1;
        records
            .meals_by_user
            .entry(meal.user_id.clone())
            .or_default()
            .push(meal.id.clone());
        records.meals.insert(meal.id.clone(), meal.clone());

        tracing::info!(
            "Logged {} meal {} for user {} ({} items)",
            meal.meal_type,
            meal.id,
            meal.user_id,
            meal.food_items.len()
        );
        Ok(meal)
    }

    fn list_meals(&self, user_id: &str, date: Option<NaiveDate>) -> Result<Vec<Meal>> {
        let records = self.records.read();

        if !records.users.contains_key(user_id) {
            return Err(Error::NotFound("User not found".into()));
        }

        let owned = records
            .meals_by_user
            .get(user_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| records.meals.get(id))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let mut meals: Vec<Meal> = filter_by_date(owned, date).cloned().collect();
        // stable: meals with equal timestamps keep insertion order
        meals.sort_by_key(|meal| meal.logged_at);
        Ok(meals)
    }

    fn user_count(&self) -> usize {
        self.records.read().users.len()
    }

    fn meal_count(&self) -> usize {
        self.records.read().meals.len()
    }
}
