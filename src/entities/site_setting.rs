//! Site setting entity - Stores key-value pairs for shop-wide settings.
//! The storefront settings blob lives under a single key as JSON.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Site setting database model - stores key-value configuration pairs
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "site_settings")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Setting key (e.g., `"storefront"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Setting value, JSON-encoded
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// When this setting was last modified
    pub updated_at: DateTime,
}

/// `SiteSetting` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
