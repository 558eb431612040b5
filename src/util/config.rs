use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

use crate::domain::Units;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "CarrierRates";
const APP_NAME: &str = "CarrierRates";
const CONFIG_FILENAME: &str = "shipping.json";

/// Process-wide shipping settings. Read once, then passed by reference into every call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingConfig {
    /// Converts catalog weights into ounces (16.0 for catalogs kept in pounds).
    pub unit_multiplier: f64,
    /// Substituted for variants without a usable weight.
    pub default_weight: f64,
    pub units: Units,
    /// Global per-package cap in catalog units. 0 disables it.
    pub max_weight_per_package: f64,
    /// Added to every quoted price, in major currency units.
    pub handling_fee: f64,
    pub freight_account: Option<String>,
    /// Use per-stock-location carrier credentials when all of them are present.
    pub multi_warehouse: bool,
    pub locale: String,
    pub cache_ttl_secs: u64,
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            unit_multiplier: 16.0,
            default_weight: 0.0,
            units: Units::Imperial,
            max_weight_per_package: 0.0,
            handling_fee: 0.0,
            freight_account: None,
            multi_warehouse: false,
            locale: "en".to_string(),
            cache_ttl_secs: 60 * 60,
        }
    }
}

impl ShippingConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn freight_account(&self) -> Option<&str> {
        self.freight_account
            .as_deref()
            .filter(|account| !account.trim().is_empty())
    }
}

/// Per-user config location, if the platform exposes one.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

pub fn load_config(path: &Path) -> Result<ShippingConfig, ConfigError> {
    let data = fs::read_to_string(path)?;
    let config: ShippingConfig = serde_json::from_str(&data)?;
    validate(&config)?;
    tracing::debug!(path = %path.display(), "loaded shipping config");
    Ok(config)
}

/// Loads the per-user config, falling back to defaults when it is missing or broken.
pub fn load_or_default() -> ShippingConfig {
    let Some(path) = default_config_path() else {
        tracing::info!("no config directory available, using default shipping config");
        return ShippingConfig::default();
    };

    if !path.exists() {
        tracing::info!(path = %path.display(), "no shipping config found, using defaults");
        return ShippingConfig::default();
    }

    match load_config(&path) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to load shipping config, using defaults");
            ShippingConfig::default()
        }
    }
}

pub fn save_config(path: &Path, config: &ShippingConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}

fn validate(config: &ShippingConfig) -> Result<(), ConfigError> {
    if !config.unit_multiplier.is_finite() || config.unit_multiplier <= 0.0 {
        return Err(ConfigError::Invalid(format!(
            "unit_multiplier must be positive, got {}",
            config.unit_multiplier
        )));
    }
    if !config.max_weight_per_package.is_finite() || config.max_weight_per_package < 0.0 {
        return Err(ConfigError::Invalid(format!(
            "max_weight_per_package must not be negative, got {}",
            config.max_weight_per_package
        )));
    }
    if !config.handling_fee.is_finite() {
        return Err(ConfigError::Invalid("handling_fee must be finite".into()));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid shipping config: {0}")]
    Invalid(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shipping.json");
        fs::write(&path, r#"{ "handling_fee": 2.5, "units": "metric" }"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.handling_fee, 2.5);
        assert_eq!(config.units, Units::Metric);
        assert_eq!(config.unit_multiplier, 16.0);
        assert_eq!(config.cache_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn rejects_non_positive_multiplier() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shipping.json");
        fs::write(&path, r#"{ "unit_multiplier": 0 }"#).unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("shipping.json");
        let config = ShippingConfig {
            freight_account: Some("FR-1".into()),
            multi_warehouse: true,
            ..ShippingConfig::default()
        };

        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn blank_freight_account_is_ignored() {
        let config = ShippingConfig {
            freight_account: Some("  ".into()),
            ..ShippingConfig::default()
        };
        assert_eq!(config.freight_account(), None);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
