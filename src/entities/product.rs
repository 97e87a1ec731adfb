//! Product entity - Represents an item in the shop's catalog.
//!
//! Prices are whole rubles. Weight is free text ("300г", "1л") and is only ever
//! interpreted through its numeric prefix by the repricer. A product may carry
//! variants (flavors or sizes) stored in `product_variants`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier assigned by the store
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Сыр сливочный")
    pub name: String,
    /// Base price in rubles
    pub price: i64,
    /// Free-text weight of one unit (e.g., "300г")
    pub weight: String,
    /// Image URL or embedded data URL
    #[sea_orm(column_type = "Text")]
    pub image: String,
    /// Catalog category (e.g., "cheese", "dairy")
    pub category: String,
    /// Units available
    pub stock: i64,
    /// When the product was created
    pub created_at: DateTime,
    /// When the product was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product has many variants
    #[sea_orm(has_many = "super::product_variant::Entity")]
    Variants,
}

impl Related<super::product_variant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Variants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
