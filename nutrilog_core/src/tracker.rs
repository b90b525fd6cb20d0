//! Tracker facade: one entry point per external operation.
//!
//! Transports hand in already-deserialized requests and serialize the
//! returned values. Every operation either completes fully or leaves the
//! store untouched.

use crate::aggregator::{self, filter_by_date};
use crate::config::Config;
use crate::food_db::FoodDatabase;
use crate::store::{InMemoryStore, MealOrigin, NewMeal, RecordStore};
use crate::{
    bmr, parser, Error, FoodItem, Gender, Meal, MealType, NutrientTotals, Result, UserProfile,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const SUCCESS: &str = "success";

// ============================================================================
// Requests
// ============================================================================

/// Registration fields as received from a client
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub age: i64,
    pub weight: f64,
    pub height: f64,
    pub gender: String,
    pub goal: String,
}

/// Direct meal logging request
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MealLogRequest {
    pub user: String,
    pub meal: String,
    pub items: Vec<String>,
}

/// Free-text webhook payload
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WebhookMessage {
    pub message: String,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Clone, Debug, Serialize)]
pub struct Registered {
    pub status: &'static str,
    pub message: &'static str,
    pub user_id: String,
    pub bmr: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct MealLogged {
    pub status: &'static str,
    pub message: &'static str,
    pub meal_id: String,
    pub nutrients: NutrientTotals,
}

#[derive(Clone, Debug, Serialize)]
pub struct MealList {
    pub status: &'static str,
    pub user: String,
    pub meals: Vec<Meal>,
    pub total_meals: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct UserInfo {
    pub name: String,
    pub bmr: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct UserStatus {
    pub status: &'static str,
    pub user: String,
    pub user_info: UserInfo,
    pub consumed_nutrients: NutrientTotals,
    pub total_meals: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct WebhookLogged {
    pub status: &'static str,
    pub message: &'static str,
    pub meal_id: String,
    pub meal_type: MealType,
    pub food_items: Vec<String>,
    pub nutrients: NutrientTotals,
}

#[derive(Clone, Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub users_count: usize,
    pub meals_count: usize,
    pub version: &'static str,
}

/// Parse an optional `YYYY-MM-DD` filter
pub fn parse_date_filter(date: Option<&str>) -> Result<Option<NaiveDate>> {
    date.map(|text| {
        NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map_err(|_| Error::Validation("Invalid date format. Use YYYY-MM-DD".into()))
    })
    .transpose()
}

// ============================================================================
// Tracker
// ============================================================================

/// Owns the record store, the food database and the webhook owner settings
pub struct NutritionTracker<S: RecordStore = InMemoryStore> {
    store: S,
    foods: FoodDatabase,
    webhook_user_id: String,
    webhook_profile: UserProfile,
}

impl NutritionTracker<InMemoryStore> {
    /// Tracker over a fresh in-memory store
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_store(InMemoryStore::new(), config)
    }
}

impl<S: RecordStore> NutritionTracker<S> {
    /// Build a tracker over any store. Fails if the configured catalogue or
    /// default webhook profile is invalid.
    pub fn with_store(store: S, config: &Config) -> Result<Self> {
        let foods = FoodDatabase::with_custom(&config.foods.custom)?;
        let errors = foods.validate();
        if !errors.is_empty() {
            return Err(Error::Config(format!(
                "food database validation failed: {}",
                errors.join("; ")
            )));
        }

        let webhook_profile = config.webhook.default_profile.to_profile()?;
        if config.webhook.default_user_id.trim().is_empty() {
            return Err(Error::Config("webhook.default_user_id is empty".into()));
        }

        tracing::debug!("Tracker ready with {} foods", foods.len());
        Ok(Self {
            store,
            foods,
            webhook_user_id: config.webhook.default_user_id.clone(),
            webhook_profile,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Catalogue entries sorted by name
    pub fn foods(&self) -> Vec<&FoodItem> {
        self.foods.items()
    }

    /// Register a user and compute their BMR
    pub fn register(&self, request: RegisterRequest) -> Result<Registered> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(Error::Validation("name must not be empty".into()));
        }
        let age = u32::try_from(request.age)
            .ok()
            .filter(|age| *age > 0)
            .ok_or_else(|| Error::Validation("age must be a positive integer".into()))?;
        if !(request.weight.is_finite() && request.weight > 0.0) {
            return Err(Error::Validation("weight must be positive".into()));
        }
        if !(request.height.is_finite() && request.height > 0.0) {
            return Err(Error::Validation("height must be positive".into()));
        }

        let gender: Gender = request.gender.parse()?;
        let bmr = bmr::bmr_for(gender, request.weight, request.height, age);

        let user = self.store.create_user(
            UserProfile {
                name: name.to_string(),
                age,
                weight_kg: request.weight,
                height_cm: request.height,
                gender,
                goal: request.goal,
            },
            bmr,
        )?;

        Ok(Registered {
            status: SUCCESS,
            message: "User registered successfully",
            user_id: user.id,
            bmr: user.bmr,
        })
    }

    /// Log a meal for a registered user
    pub fn log_meal(&self, request: MealLogRequest) -> Result<MealLogged> {
        if self.store.get_user(&request.user).is_none() {
            return Err(Error::NotFound("User not found".into()));
        }
        let meal_type: MealType = request.meal.parse()?;
        if request.items.is_empty() {
            return Err(Error::Validation("No food items provided".into()));
        }

        let unknown = aggregator::unrecognized_items(&self.foods, &request.items);
        if !unknown.is_empty() {
            tracing::debug!("Logging meal with unrecognized foods: {:?}", unknown);
        }
        let nutrients = aggregator::resolve(&self.foods, &request.items);

        let meal = self.store.create_meal(NewMeal {
            user_id: request.user,
            meal_type,
            food_items: request.items,
            nutrients,
            origin: MealOrigin::Direct,
        })?;

        Ok(MealLogged {
            status: SUCCESS,
            message: "Meal logged successfully",
            meal_id: meal.id,
            nutrients: meal.nutrients,
        })
    }

    /// A user's meals, optionally for one `YYYY-MM-DD` date
    pub fn meals(&self, user: &str, date: Option<&str>) -> Result<MealList> {
        let date = parse_date_filter(date)?;
        let meals = self.store.list_meals(user, date)?;

        Ok(MealList {
            status: SUCCESS,
            user: user.to_string(),
            total_meals: meals.len(),
            meals,
        })
    }

    /// Consumed nutrients against the user's BMR, overall or for one date
    pub fn status(&self, user: &str, date: Option<&str>) -> Result<UserStatus> {
        let date = parse_date_filter(date)?;
        let owner = self
            .store
            .get_user(user)
            .ok_or_else(|| Error::NotFound("User not found".into()))?;

        let meals = self.store.list_meals(user, None)?;
        let consumed = aggregator::summarize(&meals, date);
        let total_meals = filter_by_date(&meals, date).count();

        Ok(UserStatus {
            status: SUCCESS,
            user: user.to_string(),
            user_info: UserInfo {
                name: owner.profile.name,
                bmr: owner.bmr,
            },
            consumed_nutrients: consumed,
            total_meals,
        })
    }

    /// Log a meal from free text against the default webhook user
    pub fn webhook(&self, payload: WebhookMessage) -> Result<WebhookLogged> {
        let command = parser::parse(&payload.message).map_err(|e| {
            tracing::warn!("Rejected webhook message: {}", e);
            Error::InvalidMessage(e)
        })?;

        let owner = self.store.ensure_user(
            &self.webhook_user_id,
            self.webhook_profile.clone(),
            bmr::bmr_for(
                self.webhook_profile.gender,
                self.webhook_profile.weight_kg,
                self.webhook_profile.height_cm,
                self.webhook_profile.age,
            ),
        )?;

        let nutrients = aggregator::resolve(&self.foods, &command.food_items);
        let meal = self.store.create_meal(NewMeal {
            user_id: owner.id,
            meal_type: command.meal_type,
            food_items: command.food_items,
            nutrients,
            origin: MealOrigin::Webhook,
        })?;

        Ok(WebhookLogged {
            status: SUCCESS,
            message: "Meal logged via webhook successfully",
            meal_id: meal.id,
            meal_type: meal.meal_type,
            food_items: meal.food_items,
            nutrients: meal.nutrients,
        })
    }

    /// Liveness summary; never fails
    pub fn health(&self) -> Health {
        Health {
            status: "healthy",
            timestamp: Utc::now(),
            users_count: self.store.user_count(),
            meals_count: self.store.meal_count(),
            version: crate::core_version(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, INVALID_MESSAGE_FORMAT};
    use crate::parser::ParseError;

    fn tracker() -> NutritionTracker {
        crate::logging::init_test();
        NutritionTracker::new(&Config::default()).unwrap()
    }

    fn john() -> RegisterRequest {
        RegisterRequest {
            name: "John Doe".into(),
            age: 30,
            weight: 75.5,
            height: 175.0,
            gender: "male".into(),
            goal: "weight loss".into(),
        }
    }

    fn lunch(user: &str, items: &[&str]) -> MealLogRequest {
        MealLogRequest {
            user: user.into(),
            meal: "lunch".into(),
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_register_computes_bmr() {
        let tracker = tracker();
        let registered = tracker.register(john()).unwrap();

        assert!(registered.user_id.starts_with("user_1_"));
        assert!((registered.bmr - 1769.35).abs() < 0.01);

        let user = tracker.store().get_user(&registered.user_id).unwrap();
        assert_eq!(user.bmr, registered.bmr);
        assert_eq!(user.profile.goal, "weight loss");
    }

    #[test]
    fn test_register_female() {
        let tracker = tracker();
        let registered = tracker
            .register(RegisterRequest {
                name: "Alice Johnson".into(),
                age: 28,
                weight: 65.0,
                height: 165.0,
                gender: "Female".into(),
                goal: "maintain weight".into(),
            })
            .unwrap();
        assert_eq!(registered.bmr, 1438.58);
    }

    #[test]
    fn test_register_rejects_bad_input() {
        let tracker = tracker();

        let mut bad_gender = john();
        bad_gender.gender = "other".into();
        assert_eq!(
            tracker.register(bad_gender).unwrap_err().kind(),
            ErrorKind::Validation
        );

        let mut bad_age = john();
        bad_age.age = 0;
        assert!(matches!(tracker.register(bad_age), Err(Error::Validation(_))));

        let mut bad_weight = john();
        bad_weight.weight = -1.0;
        assert!(matches!(tracker.register(bad_weight), Err(Error::Validation(_))));

        let mut blank_name = john();
        blank_name.name = "  ".into();
        assert!(matches!(tracker.register(blank_name), Err(Error::Validation(_))));

        assert_eq!(tracker.health().users_count, 0);
    }

    #[test]
    fn test_log_meal_resolves_nutrients() {
        let tracker = tracker();
        let user_id = tracker.register(john()).unwrap().user_id;

        let logged = tracker
            .log_meal(lunch(&user_id, &["rice", "dal", "cucumber"]))
            .unwrap();
        assert!(logged.meal_id.starts_with("meal_1_"));
        assert_eq!(logged.nutrients, NutrientTotals::new(262.0, 10.2, 51.6, 8.4));
    }

    #[test]
    fn test_log_meal_keeps_unknown_items() {
        let tracker = tracker();
        let user_id = tracker.register(john()).unwrap().user_id;

        let logged = tracker
            .log_meal(lunch(&user_id, &["Rice", "unknownfood123"]))
            .unwrap();
        assert_eq!(logged.nutrients.calories.as_f64(), 130.0);

        let meals = tracker.meals(&user_id, None).unwrap();
        assert_eq!(meals.meals[0].food_items, vec!["Rice", "unknownfood123"]);
    }

    #[test]
    fn test_log_meal_failures_create_nothing() {
        let tracker = tracker();
        let user_id = tracker.register(john()).unwrap().user_id;

        let err = tracker.log_meal(lunch("user_404_0", &["rice"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let mut supper = lunch(&user_id, &["rice"]);
        supper.meal = "supper".into();
        assert_eq!(
            tracker.log_meal(supper).unwrap_err().kind(),
            ErrorKind::Validation
        );

        assert!(matches!(
            tracker.log_meal(lunch(&user_id, &[])),
            Err(Error::Validation(_))
        ));

        assert_eq!(tracker.health().meals_count, 0);
        let logged = tracker.log_meal(lunch(&user_id, &["rice"])).unwrap();
        assert!(logged.meal_id.starts_with("meal_1_"));
    }

    #[test]
    fn test_meals_date_filter_and_bad_date() {
        let tracker = tracker();
        let user_id = tracker.register(john()).unwrap().user_id;
        tracker.log_meal(lunch(&user_id, &["rice"])).unwrap();

        let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(tracker.meals(&user_id, Some(&today)).unwrap().total_meals, 1);
        assert_eq!(
            tracker.meals(&user_id, Some("1999-01-01")).unwrap().total_meals,
            0
        );

        let err = tracker.meals(&user_id, Some("01/02/2025")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid date format. Use YYYY-MM-DD");
        assert_eq!(
            tracker.meals("nobody", None).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_status_sums_meals() {
        let tracker = tracker();
        let user_id = tracker.register(john()).unwrap().user_id;

        let empty = tracker.status(&user_id, None).unwrap();
        assert!(empty.consumed_nutrients.is_zero());
        assert_eq!(empty.total_meals, 0);

        tracker.log_meal(lunch(&user_id, &["rice", "dal"])).unwrap();
        tracker.log_meal(lunch(&user_id, &["cucumber"])).unwrap();

        let status = tracker.status(&user_id, None).unwrap();
        assert_eq!(status.user_info.name, "John Doe");
        assert_eq!(status.total_meals, 2);
        assert_eq!(
            status.consumed_nutrients,
            NutrientTotals::new(262.0, 10.2, 51.6, 8.4)
        );

        let past = tracker.status(&user_id, Some("1999-01-01")).unwrap();
        assert!(past.consumed_nutrients.is_zero());
        assert_eq!(past.total_meals, 0);

        assert_eq!(
            tracker.status("nobody", None).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_webhook_logs_against_default_user() {
        let tracker = tracker();
        let logged = tracker
            .webhook(WebhookMessage {
                message: "log lunch: rice, dal, cucumber".into(),
            })
            .unwrap();

        assert!(logged.meal_id.starts_with("webhook_meal_1_"));
        assert_eq!(logged.meal_type, MealType::Lunch);
        assert_eq!(logged.food_items, vec!["rice", "dal", "cucumber"]);
        assert_eq!(logged.nutrients, NutrientTotals::new(262.0, 10.2, 51.6, 8.4));

        let owner = tracker.store().get_user("webhook_user").unwrap();
        assert_eq!(owner.profile.name, "Webhook User");

        tracker
            .webhook(WebhookMessage {
                message: "log dinner: fish".into(),
            })
            .unwrap();
        let health = tracker.health();
        assert_eq!(health.users_count, 1);
        assert_eq!(health.meals_count, 2);
    }

    #[test]
    fn test_webhook_rejects_malformed_text() {
        let tracker = tracker();
        for message in ["log supper: rice", "lunch: rice", "log lunch rice", "log lunch: ,"] {
            let err = tracker
                .webhook(WebhookMessage {
                    message: message.into(),
                })
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert_eq!(err.to_string(), INVALID_MESSAGE_FORMAT);
        }

        let err = tracker
            .webhook(WebhookMessage {
                message: "log brunch: egg".into(),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidMessage(ParseError::UnknownMealType(ref t)) if t == "brunch"
        ));

        // rejected messages never create the default user
        assert_eq!(tracker.health().users_count, 0);
    }

    #[test]
    fn test_webhook_uses_configured_default_user() {
        let mut config = Config::default();
        config.webhook.default_user_id = "whatsapp_bot".into();
        config.webhook.default_profile.gender = "female".into();
        let tracker = NutritionTracker::new(&config).unwrap();

        tracker
            .webhook(WebhookMessage {
                message: "log breakfast: egg".into(),
            })
            .unwrap();

        let status = tracker.status("whatsapp_bot", None).unwrap();
        assert_eq!(status.total_meals, 1);
        assert_eq!(status.consumed_nutrients.calories.as_f64(), 155.0);
    }

    #[test]
    fn test_health_is_idempotent() {
        let tracker = tracker();
        let user_id = tracker.register(john()).unwrap().user_id;
        tracker.log_meal(lunch(&user_id, &["egg"])).unwrap();

        let first = tracker.health();
        let second = tracker.health();
        assert_eq!(first.users_count, second.users_count);
        assert_eq!(first.meals_count, second.meals_count);
        assert_eq!(first.status, "healthy");

        let s1 = tracker.status(&user_id, None).unwrap();
        let s2 = tracker.status(&user_id, None).unwrap();
        assert_eq!(s1.consumed_nutrients, s2.consumed_nutrients);
        assert_eq!(s1.total_meals, s2.total_meals);
    }

    #[test]
    fn test_invalid_default_profile_rejected() {
        let mut config = Config::default();
        config.webhook.default_profile.gender = "robot".into();
        assert!(matches!(
            NutritionTracker::new(&config),
            Err(Error::Config(_))
        ));

        let mut config = Config::default();
        config.webhook.default_profile.age = 0;
        config.webhook.default_profile.weight_kg = -70.0;
        config.webhook.default_profile.height_cm = 0.0;
        assert!(matches!(
            NutritionTracker::new(&config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_out_of_range_custom_food_rejected() {
        use crate::config::CustomFood;
        use crate::FoodCategory;

        for calories in [f64::NAN, f64::INFINITY, 1e18] {
            let mut config = Config::default();
            config.foods.custom.push(CustomFood {
                name: "huge".into(),
                category: FoodCategory::MixedDish,
                calories,
                protein: 0.0,
                carbs: 0.0,
                fiber: 0.0,
            });
            assert!(matches!(
                NutritionTracker::new(&config),
                Err(Error::Config(_))
            ));
        }
    }
}
