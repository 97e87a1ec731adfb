//! Staff configuration module for loading back-office Discord user IDs.
//!
//! `SHOP_STAFF_IDS` holds a comma-separated list of Discord user IDs allowed to
//! run staff commands. Logged-in accounts with `is_admin` are also treated as
//! staff by the bot; this list covers staff who never registered an account.

use std::collections::HashSet;

/// Parses a comma-separated ID list, skipping blanks and non-numeric entries.
#[must_use]
pub fn parse_staff_ids(raw: &str) -> HashSet<u64> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .filter_map(|id| {
            id.parse::<u64>()
                .inspect_err(|_| tracing::warn!("Ignoring invalid staff ID '{id}'"))
                .ok()
        })
        .collect()
}

/// Reads staff IDs from the `SHOP_STAFF_IDS` environment variable.
///
/// Returns an empty set when the variable is not configured.
#[must_use]
pub fn get_staff_ids() -> HashSet<u64> {
    std::env::var("SHOP_STAFF_IDS")
        .map(|raw| parse_staff_ids(&raw))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_staff_ids() {
        let ids = parse_staff_ids("123, 456 ,, abc,789");
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&123));
        assert!(ids.contains(&456));
        assert!(ids.contains(&789));
    }

    #[test]
    fn test_parse_staff_ids_empty() {
        assert!(parse_staff_ids("").is_empty());
        assert!(parse_staff_ids(" , ").is_empty());
    }
}
