#![forbid(unsafe_code)]

//! Core domain model and business logic for the Nutrilog system.
//!
//! This crate provides:
//! - Domain types (nutrient totals, foods, users, meals)
//! - The seeded food database
//! - BMR calculation
//! - Webhook message parsing
//! - Nutrient aggregation
//! - In-memory record store and the tracker facade

pub mod types;
pub mod error;
pub mod food_db;
pub mod config;
pub mod logging;
pub mod bmr;
pub mod parser;
pub mod aggregator;
pub mod store;
pub mod tracker;

// Re-export commonly used types
pub use error::{Error, ErrorKind, Result};
pub use types::*;
pub use food_db::{build_default_food_database, get_default_food_database, FoodDatabase};
pub use config::Config;
pub use bmr::compute_bmr;
pub use parser::{parse, ParseError};
pub use aggregator::{resolve, summarize};
pub use store::{InMemoryStore, RecordStore};
pub use tracker::{MealLogRequest, NutritionTracker, RegisterRequest, WebhookMessage};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
