//! Framework-agnostic shop logic.
//!
//! Everything here takes a `&DatabaseConnection` (or plain values) and returns
//! [`crate::errors::Result`]; the Discord layer only parses input and formats
//! output.

/// Customer accounts, sessions, and profile search
pub mod auth;
/// In-memory cart ledger
pub mod cart;
/// Cart-to-order validation and placement
pub mod checkout;
/// Orders, line edits, and status changes
pub mod order;
/// Weight parsing and repricing
pub mod pricing;
/// Catalog products and variants
pub mod product;
/// Storefront settings blob
pub mod settings;
/// Production needs over active orders
pub mod summary;
/// One-time e-mail verification codes
pub mod verification;
