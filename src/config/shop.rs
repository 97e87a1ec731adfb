//! Shop configuration loaded from config.toml
//!
//! The file carries shop-wide options under `[shop]` and the seed catalog as a
//! list of `[[products]]`. The catalog is only written to the database when the
//! products table is empty, so editing config.toml after first run has no effect
//! on existing products.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Shop-wide behavior switches
    #[serde(default)]
    pub shop: ShopOptions,
    /// Products to seed into an empty catalog
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

/// Options under the `[shop]` table
#[derive(Debug, Deserialize, Clone)]
pub struct ShopOptions {
    /// Shop name used in bot replies
    #[serde(default = "default_shop_name")]
    pub name: String,
    /// Reject status changes that skip or revert a step
    #[serde(default)]
    pub strict_status_transitions: bool,
    /// Base URL of the Telegram Bot API
    #[serde(default = "default_telegram_api_base")]
    pub telegram_api_base: String,
    /// Lifetime of e-mail verification codes
    #[serde(default = "default_code_ttl_minutes")]
    pub verification_code_ttl_minutes: i64,
}

impl Default for ShopOptions {
    fn default() -> Self {
        Self {
            name: default_shop_name(),
            strict_status_transitions: false,
            telegram_api_base: default_telegram_api_base(),
            verification_code_ttl_minutes: default_code_ttl_minutes(),
        }
    }
}

fn default_shop_name() -> String {
    "Сыроварня SOBKO".to_string()
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

const fn default_code_ttl_minutes() -> i64 {
    10
}

/// Configuration for a single seed product
#[derive(Debug, Deserialize, Clone)]
pub struct ProductSeed {
    pub name: String,
    /// Price in rubles
    pub price: i64,
    pub weight: String,
    #[serde(default)]
    pub image: String,
    pub category: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub variants: Vec<VariantSeed>,
}

/// Configuration for a seed product's variant
#[derive(Debug, Deserialize, Clone)]
pub struct VariantSeed {
    pub name: String,
    pub price: i64,
    pub weight: String,
}

/// Loads the shop configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads the configuration from `SHOP_CONFIG_PATH`, or ./config.toml when unset.
///
/// A missing file is not an error: the shop starts with default options and no
/// seed catalog.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("SHOP_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        tracing::warn!("Config file {path} not found, using defaults");
        return Ok(AppConfig::default());
    }
    let config = load_config(&path)?;
    tracing::info!(
        "Loaded configuration from {path} ({} seed products)",
        config.products.len()
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_shop_config() {
        let toml_str = r#"
            [shop]
            name = "Test Dairy"
            strict_status_transitions = true

            [[products]]
            name = "Сыр сливочный"
            price = 450
            weight = "300г"
            category = "cheese"
            stock = 15

            [[products]]
            name = "Сыр с травами"
            price = 500
            weight = "300г"
            category = "cheese"

            [[products.variants]]
            name = "с укропом"
            price = 520
            weight = "300г"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.shop.name, "Test Dairy");
        assert!(config.shop.strict_status_transitions);
        assert_eq!(config.shop.telegram_api_base, "https://api.telegram.org");
        assert_eq!(config.products.len(), 2);
        assert_eq!(config.products[0].price, 450);
        assert_eq!(config.products[0].stock, 15);
        assert!(config.products[0].variants.is_empty());
        assert_eq!(config.products[1].stock, 0);
        assert_eq!(config.products[1].variants[0].name, "с укропом");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(!config.shop.strict_status_transitions);
        assert_eq!(config.shop.verification_code_ttl_minutes, 10);
        assert!(config.products.is_empty());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = load_config("/definitely/not/here/config.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_bundled_config_seeds_catalog() {
        let config = load_config(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml")).unwrap();
        assert_eq!(config.products.len(), 6);
        assert_eq!(config.products[0].name, "Сыр сливочный");
        assert_eq!(config.products[0].price, 450);
        assert!(!config.shop.strict_status_transitions);
    }
}
