//! Configuration management for the nutrition engine
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: NT__)

use anyhow::Result;
use nutrition_tracker_shared::NutritionSettings;
use serde::{Deserialize, Serialize};
use std::env;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Settings in effect before stored health metrics are loaded
    #[serde(default)]
    pub profile: NutritionSettings,
    pub account: AccountConfig,
    pub notices: NoticesConfig,
}

/// Account configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Unlocks custom macro ratios
    pub premium: bool,
}

/// Notice channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticesConfig {
    /// Notices buffered per subscriber before old ones are dropped
    pub capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profile: NutritionSettings::default(),
            account: AccountConfig { premium: false },
            notices: NoticesConfig { capacity: 64 },
        }
    }
}

impl EngineConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with NT__ prefix
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);
        // e.g., NT__ACCOUNT__PREMIUM=true sets account.premium
        let environment = config::Environment::with_prefix("NT")
            .separator("__")
            .try_parsing(true);

        Self::load_from(&config_file, environment)
    }

    fn load_from(config_file: &str, environment: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Config::try_from(&EngineConfig::default())?)
            .add_source(config::File::with_name(config_file).required(false))
            .add_source(environment)
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }
}
