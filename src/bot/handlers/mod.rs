//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions such as autocomplete
//! and the permission checks attached to staff commands.

/// Autocomplete handlers for product names and categories
pub mod autocomplete;
/// Command checks
pub mod checks;
