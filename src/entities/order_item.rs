//! Order item entity - One line of an order, snapshotting the product.
//!
//! The snapshot is taken at checkout so later catalog edits never change past
//! orders. `original_price` and `original_weight` are the repricing baseline;
//! rows written before they existed leave them NULL.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order line database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning order
    pub order_id: i64,
    /// Position of the line within its order
    pub position: i32,
    /// Catalog id of the product at checkout time
    pub product_id: i64,
    /// Product name at checkout time
    pub name: String,
    /// Selected variant, if any
    pub variant_name: Option<String>,
    /// Current unit price (may be edited by staff)
    pub price: i64,
    /// Current weight (may be edited by staff)
    pub weight: String,
    /// Unit price when ordered
    pub original_price: Option<i64>,
    /// Weight when ordered
    pub original_weight: Option<String>,
    pub quantity: i64,
}

/// Defines relationships between `OrderItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
