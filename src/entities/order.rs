//! Order entity - A placed customer order.
//!
//! `total` is derived from the order's lines and is rewritten on every line edit.
//! `version` starts at 1 and increments on every write; updates are conditional on
//! the version the caller read. `status` and `delivery_type` are stored as their
//! lowercase wire names (`"new"`, `"pickup"`, ...).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier assigned by the store
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Customer's full name
    pub customer_name: String,
    /// Contact phone
    pub phone: String,
    /// Delivery address, or the pickup marker for pickup orders
    pub address: String,
    /// Optional free-text comment
    pub comment: Option<String>,
    /// Sum of price × quantity over all lines
    pub total: i64,
    /// `"delivery"` or `"pickup"`
    pub delivery_type: String,
    /// `"new"`, `"preparing"`, `"ready"`, or `"completed"`
    pub status: String,
    /// When the order was placed
    pub date: DateTimeUtc,
    /// E-mail of the logged-in customer who placed it, if any
    pub customer_email: Option<String>,
    /// Optimistic concurrency counter
    pub version: i32,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One order has many line items
    #[sea_orm(has_many = "super::order_item::Entity")]
    Items,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
