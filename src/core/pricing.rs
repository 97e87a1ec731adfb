//! Weight-based repricing.
//!
//! Staff weigh cheese after an order is placed and type the actual weight as free
//! text. The line price is re-scaled by the ratio of the numeric prefixes of the
//! two weight strings. Units are never interpreted: "1кг" and "1г" both read as 1.

use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::unwrap_used)] // Literal pattern, covered by tests
static WEIGHT_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)").unwrap());

/// Extracts the first decimal number from a weight string.
///
/// Returns `0.0` when the string contains no digits.
///
/// ```
/// use dairy_shop::core::pricing::parse_weight;
/// assert_eq!(parse_weight("500г"), 500.0);
/// assert_eq!(parse_weight("1.5 кг"), 1.5);
/// assert_eq!(parse_weight("шт"), 0.0);
/// ```
#[must_use]
pub fn parse_weight(weight: &str) -> f64 {
    WEIGHT_TOKEN
        .captures(weight)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Re-scales `base_price` from `original_weight` to `new_weight`.
///
/// Computes `round(base_price / original × new)`. When the original weight has
/// no numeric part (or is zero) the base price is returned unchanged.
#[must_use]
pub fn reprice(base_price: i64, original_weight: &str, new_weight: &str) -> i64 {
    let original = parse_weight(original_weight);
    if original == 0.0 {
        return base_price;
    }
    let new = parse_weight(new_weight);

    // Prices are whole rubles well inside f64's exact integer range.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    let repriced = (base_price as f64 / original * new).round() as i64;
    repriced
}

/// Price per 100 units of weight, rounded, for display next to an order line.
///
/// Returns `None` when the weight has no numeric part.
#[must_use]
pub fn price_per_100g(price: i64, weight: &str) -> Option<i64> {
    let grams = parse_weight(weight);
    if grams == 0.0 {
        return None;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    let per_100 = (price as f64 / grams * 100.0).round() as i64;
    Some(per_100)
}
