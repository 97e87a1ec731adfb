//! Unified error type for the shop.
//!
//! Core operations, the notifier, and the bot layer all return [`Result`], so a
//! command handler can propagate any failure with `?` and let the framework's
//! error hook log it.

use thiserror::Error;

/// Every failure the shop can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Input rejected before anything was written
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable reason, safe to show to the user
        message: String,
    },

    /// A price or stock value that is negative or otherwise unusable
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected value
        amount: i64,
    },

    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: i64 },

    #[error("Product not found: {name}")]
    ProductNotFound { name: String },

    #[error("Variant '{variant}' not found for product {product_id}")]
    VariantNotFound { product_id: i64, variant: String },

    #[error("Order not found: {id}")]
    OrderNotFound { id: i64 },

    #[error("Order line {index} not found in order {order_id}")]
    OrderLineNotFound { order_id: i64, index: usize },

    /// The order changed since the caller read it
    #[error("Order {id} was modified by someone else (expected version {expected})")]
    StaleOrder { id: i64, expected: i32 },

    #[error("Cannot move order from '{from}' to '{to}'")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Unknown order status: {value}")]
    UnknownStatus { value: String },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Cart line not found")]
    CartLineNotFound,

    /// Delivery orders must reach the configured minimum
    #[error("Delivery requires at least {minimum} ₽ (cart total is {total} ₽)")]
    BelowMinimumDelivery { total: i64, minimum: i64 },

    #[error("User not found: {id}")]
    UserNotFound { id: String },

    #[error("A user with email '{email}' already exists")]
    DuplicateEmail { email: String },

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Session is invalid or expired")]
    InvalidSession,

    #[error("Not authorized to perform this action")]
    Unauthorized,

    #[error("Verification failed: {reason}")]
    Verification { reason: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Notification rejected: {message}")]
    Notification { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

impl Error {
    /// Whether this error was caused by user input and can be shown verbatim.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            Self::Config { .. }
                | Self::Database(_)
                | Self::Http(_)
                | Self::Notification { .. }
                | Self::Json(_)
                | Self::Io(_)
                | Self::EnvVar(_)
                | Self::FrameworkError(_)
        )
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_classification() {
        assert!(Error::EmptyCart.is_user_facing());
        assert!(
            Error::BelowMinimumDelivery {
                total: 900,
                minimum: 2500
            }
            .is_user_facing()
        );
        assert!(
            !Error::Config {
                message: "missing".to_string()
            }
            .is_user_facing()
        );
        assert!(!Error::Database(sea_orm::DbErr::Custom("boom".to_string())).is_user_facing());
    }

    #[test]
    fn test_minimum_delivery_message() {
        let err = Error::BelowMinimumDelivery {
            total: 900,
            minimum: 2500,
        };
        assert_eq!(
            err.to_string(),
            "Delivery requires at least 2500 ₽ (cart total is 900 ₽)"
        );
    }
}
