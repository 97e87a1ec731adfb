//! Production needs - how much of each product must still be made.
//!
//! Only active orders (`new` or `preparing`) count. Quantities are summed per
//! catalog product id regardless of variant, and the result is sorted by name.

use crate::{
    core::order::{self, OrderDetails, OrderStatus},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Total quantity still required for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductionNeed {
    pub product_id: i64,
    pub name: String,
    pub quantity: u64,
}

/// Aggregates line quantities over the active orders in `orders`.
///
/// Orders with an unrecognized status are skipped. The name reported for a
/// product is the first one seen.
#[must_use]
pub fn production_needs(orders: &[OrderDetails]) -> Vec<ProductionNeed> {
    let mut needs: HashMap<i64, ProductionNeed> = HashMap::new();

    for details in orders {
        let Ok(status) = details.status() else {
            debug!(
                "Skipping order {} with unknown status '{}'",
                details.order.id, details.order.status
            );
            continue;
        };
        if !status.is_active() {
            continue;
        }

        for line in &details.lines {
            needs
                .entry(line.product_id)
                .or_insert_with(|| ProductionNeed {
                    product_id: line.product_id,
                    name: line.name.clone(),
                    quantity: 0,
                })
                .quantity += u64::from(line.quantity);
        }
    }

    let mut needs: Vec<ProductionNeed> = needs.into_values().collect();
    needs.sort_by(|a, b| a.name.cmp(&b.name).then(a.product_id.cmp(&b.product_id)));
    needs
}

/// Loads the active orders and summarizes them.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_production_needs(db: &DatabaseConnection) -> Result<Vec<ProductionNeed>> {
    let active = order::get_orders_by_status(db, &[OrderStatus::New, OrderStatus::Preparing]).await?;
    Ok(production_needs(&active))
}
