//! Configuration file support for Nutrilog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/nutrilog/config.toml`.

use crate::{Error, FoodCategory, FoodItem, Gender, NutrientTotals, Result, UserProfile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub webhook: WebhookConfig,

    #[serde(default)]
    pub foods: FoodsConfig,
}

/// Logging configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Owner of meals that arrive through the webhook channel
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default = "default_webhook_user_id")]
    pub default_user_id: String,

    #[serde(default)]
    pub default_profile: DefaultProfile,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            default_user_id: default_webhook_user_id(),
            default_profile: DefaultProfile::default(),
        }
    }
}

/// Profile used when the default webhook user is created
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DefaultProfile {
    #[serde(default = "default_profile_name")]
    pub name: String,
    #[serde(default = "default_profile_age")]
    pub age: u32,
    #[serde(default = "default_profile_weight")]
    pub weight_kg: f64,
    #[serde(default = "default_profile_height")]
    pub height_cm: f64,
    #[serde(default = "default_profile_gender")]
    pub gender: String,
    #[serde(default = "default_profile_goal")]
    pub goal: String,
}

impl Default for DefaultProfile {
    fn default() -> Self {
        Self {
            name: default_profile_name(),
            age: default_profile_age(),
            weight_kg: default_profile_weight(),
            height_cm: default_profile_height(),
            gender: default_profile_gender(),
            goal: default_profile_goal(),
        }
    }
}

impl DefaultProfile {
    pub fn to_profile(&self) -> Result<UserProfile> {
        let gender: Gender = self
            .gender
            .parse()
            .map_err(|e| Error::Config(format!("webhook.default_profile: {}", e)))?;
        if self.age == 0 {
            return Err(Error::Config(
                "webhook.default_profile: age must be positive".into(),
            ));
        }
        if !(self.weight_kg.is_finite() && self.weight_kg > 0.0) {
            return Err(Error::Config(
                "webhook.default_profile: weight_kg must be positive".into(),
            ));
        }
        if !(self.height_cm.is_finite() && self.height_cm > 0.0) {
            return Err(Error::Config(
                "webhook.default_profile: height_cm must be positive".into(),
            ));
        }
        Ok(UserProfile {
            name: self.name.clone(),
            age: self.age,
            weight_kg: self.weight_kg,
            height_cm: self.height_cm,
            gender,
            goal: self.goal.clone(),
        })
    }
}

/// Extra catalogue entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomFood {
    pub name: String,
    pub category: FoodCategory,
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fiber: f64,
}

impl CustomFood {
    /// Raw configured amounts, labelled by field name
    pub fn nutrient_values(&self) -> [(&'static str, f64); 4] {
        [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fiber", self.fiber),
        ]
    }

    pub fn to_food_item(&self) -> FoodItem {
        FoodItem {
            name: self.name.clone(),
            category: self.category,
            nutrients: NutrientTotals::new(self.calories, self.protein, self.carbs, self.fiber),
        }
    }
}

/// Food catalogue configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct FoodsConfig {
    #[serde(default)]
    pub custom: Vec<CustomFood>,
}

// Default value functions
fn default_log_level() -> String {
    "info".into()
}

fn default_webhook_user_id() -> String {
    "webhook_user".into()
}

fn default_profile_name() -> String {
    "Webhook User".into()
}

fn default_profile_age() -> u32 {
    25
}

fn default_profile_weight() -> f64 {
    70.0
}

fn default_profile_height() -> f64 {
    170.0
}

fn default_profile_gender() -> String {
    "male".into()
}

fn default_profile_goal() -> String {
    "general".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let base = match dirs::config_dir() {
            Some(dir) => dir,
            None => {
                let home = std::env::var("HOME").map_err(|_| {
                    Error::Config("HOME environment variable not set".into())
                })?;
                PathBuf::from(home).join(".config")
            }
        };
        Ok(base.join("nutrilog").join("config.toml"))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
