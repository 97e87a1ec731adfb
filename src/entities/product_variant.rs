//! Product variant entity - An alternate SKU of a product.
//!
//! A variant has its own price and weight. When a customer picks a variant, the
//! cart line carries the variant's price and weight instead of the parent's.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product variant database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_variants")]
pub struct Model {
    /// Unique identifier for the variant row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the parent product
    pub product_id: i64,
    /// Variant name, unique within its product (e.g., "с травами")
    pub name: String,
    /// Price in rubles
    pub price: i64,
    /// Free-text weight (e.g., "150г")
    pub weight: String,
}

/// Defines relationships between `ProductVariant` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each variant belongs to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
