//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Account registration, login, and order history
pub mod account;

/// Cart commands
pub mod cart;

/// Catalog browsing
pub mod catalog;

/// Order placement
pub mod checkout;

/// Customer account management for staff
pub mod customers;

/// General utility commands
pub mod general;

/// Order back-office and production summary
pub mod orders;

/// Catalog management commands
pub mod product;

/// Storefront settings
pub mod settings;

// Export commands
pub use account::*;
pub use cart::*;
pub use catalog::*;
pub use checkout::*;
pub use customers::*;
pub use general::*;
pub use orders::*;
pub use product::*;
pub use settings::*;
