//! Shared test utilities for the shop.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        auth::{self, AuthSession, Registration},
        order::{self, DeliveryType, NewOrder, OrderDetails, OrderLine},
        product::{self, ProductInput},
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Password used by [`register_test_user`].
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Product input with sensible defaults.
///
/// # Defaults
/// * `weight`: "300г"
/// * `category`: "cheese"
/// * `stock`: 10
pub fn product_input(name: &str, price: i64) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        price,
        weight: "300г".to_string(),
        image: String::new(),
        category: "cheese".to_string(),
        stock: 10,
    }
}

/// Creates a test product in the "cheese" category.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    price: i64,
) -> Result<entities::product::Model> {
    product::create_product(db, product_input(name, price)).await
}

/// Creates a test product with a custom category.
pub async fn create_custom_product(
    db: &DatabaseConnection,
    name: &str,
    price: i64,
    category: &str,
) -> Result<entities::product::Model> {
    let mut input = product_input(name, price);
    input.category = category.to_string();
    product::create_product(db, input).await
}

/// Unsaved product model for pure cart tests.
pub fn test_product_model(id: i64, name: &str, price: i64) -> entities::product::Model {
    let now = chrono::Utc::now().naive_utc();
    entities::product::Model {
        id,
        name: name.to_string(),
        price,
        weight: "300г".to_string(),
        image: String::new(),
        category: "cheese".to_string(),
        stock: 10,
        created_at: now,
        updated_at: now,
    }
}

/// Pickup order for "Test Customer" with the given lines.
pub fn new_test_order(lines: Vec<OrderLine>) -> NewOrder {
    NewOrder {
        customer_name: "Test Customer".to_string(),
        phone: "+7 900 000-00-00".to_string(),
        address: order::PICKUP_ADDRESS.to_string(),
        comment: None,
        delivery_type: DeliveryType::Pickup,
        customer_email: None,
        lines,
    }
}

/// Places a test order built by [`new_test_order`].
pub async fn create_test_order(
    db: &DatabaseConnection,
    lines: Vec<OrderLine>,
) -> Result<OrderDetails> {
    order::create_order(db, new_test_order(lines)).await
}

/// Registers a user with [`TEST_PASSWORD`].
pub async fn register_test_user(
    db: &DatabaseConnection,
    email: &str,
    full_name: &str,
) -> Result<AuthSession> {
    auth::register(
        db,
        Registration {
            email: email.to_string(),
            password: TEST_PASSWORD.to_string(),
            full_name: full_name.to_string(),
            phone: None,
        },
    )
    .await
}
