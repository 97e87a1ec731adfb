//! Cart ledger - the customer's pending selection before checkout.
//!
//! A cart is a small in-memory list of lines. Lines are identified by
//! `(product id, variant name)`: adding the same product and variant again bumps
//! the quantity, while a different variant of the same product gets its own line.
//! Totals are recomputed from the lines on every read.

use crate::entities::{product, product_variant};
use serde::{Deserialize, Serialize};

/// Identity of a cart line for merge, update, and removal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: i64,
    pub variant_name: Option<String>,
}

impl LineKey {
    /// Key for a product without a variant.
    #[must_use]
    pub const fn product(product_id: i64) -> Self {
        Self {
            product_id,
            variant_name: None,
        }
    }

    /// Key for a specific variant of a product.
    #[must_use]
    pub fn variant(product_id: i64, variant_name: impl Into<String>) -> Self {
        Self {
            product_id,
            variant_name: Some(variant_name.into()),
        }
    }
}

/// One line of the cart: a product projection plus quantity.
///
/// When a variant is selected, `price` and `weight` are the variant's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: i64,
    pub name: String,
    pub price: i64,
    pub weight: String,
    pub image: String,
    pub category: String,
    pub variant_name: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    /// The key identifying this line.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id,
            variant_name: self.variant_name.clone(),
        }
    }

    /// Price × quantity for this line.
    #[must_use]
    pub fn line_total(&self) -> i64 {
        self.price * i64::from(self.quantity)
    }

    fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id && self.variant_name == key.variant_name
    }
}

/// The set of lines a customer has selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLedger {
    items: Vec<CartItem>,
}

impl CartLedger {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Adds one unit of `product` (or of one of its variants).
    ///
    /// Merges into an existing line with the same product and variant, otherwise
    /// appends a new line with quantity 1 carrying the variant's price and weight.
    pub fn add(&mut self, product: &product::Model, variant: Option<&product_variant::Model>) {
        let key = LineKey {
            product_id: product.id,
            variant_name: variant.map(|v| v.name.clone()),
        };

        if let Some(existing) = self.items.iter_mut().find(|item| item.matches(&key)) {
            existing.quantity = existing.quantity.saturating_add(1);
            return;
        }

        let (price, weight) = variant.map_or_else(
            || (product.price, product.weight.clone()),
            |v| (v.price, v.weight.clone()),
        );

        self.items.push(CartItem {
            product_id: product.id,
            name: product.name.clone(),
            price,
            weight,
            image: product.image.clone(),
            category: product.category.clone(),
            variant_name: key.variant_name,
            quantity: 1,
        });
    }

    /// Sets the quantity of a line; a quantity of zero removes it.
    ///
    /// Returns `false` when no line matches `key`.
    pub fn update_quantity(&mut self, key: &LineKey, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(key);
        }

        match self.items.iter_mut().find(|item| item.matches(key)) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Removes the line identified by `key`.
    ///
    /// Returns `false` when no line matches.
    pub fn remove(&mut self, key: &LineKey) -> bool {
        let before = self.items.len();
        self.items.retain(|item| !item.matches(key));
        self.items.len() != before
    }

    /// Sum of price × quantity over all lines.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Takes the quantities of `ordered` out of this cart.
    ///
    /// Lines that drop to zero are removed; anything added after `ordered` was
    /// snapshotted stays in the cart.
    pub fn subtract(&mut self, ordered: &Self) {
        for placed in &ordered.items {
            let key = placed.key();
            if let Some(item) = self.items.iter_mut().find(|item| item.matches(&key)) {
                item.quantity = item.quantity.saturating_sub(placed.quantity);
            }
        }
        self.items.retain(|item| item.quantity > 0);
    }
}
