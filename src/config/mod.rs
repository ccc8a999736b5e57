//! # Configuration
//!
//! `config.toml` holds the rule constants of the engine, the storage locations
//! and the logging setup. Every section has defaults, so a file only needs the
//! values it changes.
//!
//! ```toml
//! [rules]
//! overweight_threshold_kg = 50.0
//! max_equipped_weapons = 4
//!
//! [storage]
//! data_dir = "data"
//!
//! [logging]
//! level = "info"
//! file = "charsheet.log"
//! ```
//!
//! ```rust,no_run
//! use charsheet::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Config::create_default("config.toml").await?;
//!     let config = Config::load("config.toml").await?;
//!     println!("AC base: {}", config.rules.base_armor_class);
//!     Ok(())
//! }
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

use crate::engine::SheetRules;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rules: SheetRules,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root for the sled database
    pub data_dir: String,
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
    #[serde(default = "default_character_seed_path")]
    pub character_seed_path: String,
}

fn default_catalog_path() -> String {
    "data/seeds/catalog.json".to_string()
}

fn default_character_seed_path() -> String {
    "data/seeds/character.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            catalog_path: default_catalog_path(),
            character_seed_path: default_character_seed_path(),
        }
    }
}

impl StorageConfig {
    /// Location of the sled database inside `data_dir`
    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("sheet")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Configured level, `Info` when unreadable
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Config {
    /// Load configuration from file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;
        config.validate()?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject rule values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        let rules = &self.rules;
        if !rules.overweight_threshold_kg.is_finite() || rules.overweight_threshold_kg < 0.0 {
            return Err(anyhow!(
                "rules.overweight_threshold_kg must be a non-negative number"
            ));
        }
        if rules.score_min > rules.score_max {
            return Err(anyhow!(
                "rules.score_min ({}) exceeds rules.score_max ({})",
                rules.score_min,
                rules.score_max
            ));
        }
        if rules.dexterity_key.trim().is_empty() {
            return Err(anyhow!("rules.dexterity_key cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let config = Config::default();
        assert_eq!(config.rules.overweight_threshold_kg, 50.0);
        assert_eq!(config.rules.max_equipped_weapons, 4);
        assert_eq!(config.rules.max_equipped_equipments, 3);
        assert_eq!(config.rules.base_armor_class, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [rules]
            max_equipped_weapons = 2

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.rules.max_equipped_weapons, 2);
        assert_eq!(config.rules.specialization_bonus, 2);
        assert_eq!(config.storage, StorageConfig::default());
        assert_eq!(config.logging.level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_validate_rejects_inverted_score_range() {
        let mut config = Config::default();
        config.rules.score_min = 21;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_path_under_data_dir() {
        let storage = StorageConfig {
            data_dir: "/tmp/sheets".to_string(),
            ..Default::default()
        };
        assert_eq!(storage.store_path(), PathBuf::from("/tmp/sheets/sheet"));
    }
}
