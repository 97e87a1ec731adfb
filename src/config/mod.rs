/// Database configuration and connection management
pub mod database;

/// Shop options and seed catalog loaded from config.toml
pub mod shop;

/// Staff Discord user IDs from environment variables
pub mod staff;

pub use shop::{AppConfig, ProductSeed, ShopOptions, VariantSeed};
