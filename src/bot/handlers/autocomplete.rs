//! Autocomplete handlers for Discord slash command parameters.
//!
//! This module suggests catalog product names, variant names, and categories as
//! the user types, so command parameters match stored names exactly.

use crate::{bot::BotData, core::product, errors::Error};

/// Discord allows at most 25 suggestions
const MAX_SUGGESTIONS: usize = 25;

fn matching(candidates: impl IntoIterator<Item = String>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<String> = candidates
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .collect();
    matching.sort();
    matching.dedup();
    matching.truncate(MAX_SUGGESTIONS);
    matching
}

/// Provides autocomplete suggestions for product names.
pub async fn autocomplete_product_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(products) = product::get_all_products(&ctx.data().database).await else {
        return Vec::new();
    };
    matching(products.into_iter().map(|p| p.product.name), partial)
}

/// Provides autocomplete suggestions for variant names across the catalog.
pub async fn autocomplete_variant_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(products) = product::get_all_products(&ctx.data().database).await else {
        return Vec::new();
    };
    matching(
        products
            .into_iter()
            .flat_map(|p| p.variants.into_iter().map(|v| v.name)),
        partial,
    )
}

/// Provides autocomplete suggestions for catalog categories.
///
/// Includes the `all` pseudo-category.
pub async fn autocomplete_category(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let categories = product::get_categories(&ctx.data().database)
        .await
        .unwrap_or_default();
    matching(
        std::iter::once(product::ALL_CATEGORIES.to_string()).chain(categories),
        partial,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_is_case_insensitive_sorted_and_capped() {
        let names = vec!["Сыр Пармезан".to_string(), "сметана".to_string(), "Сыр сливочный".to_string()];
        assert_eq!(matching(names.clone(), "сыр"), vec!["Сыр Пармезан", "Сыр сливочный"]);
        assert_eq!(matching(names, "").len(), 3);

        let many = (0..40).map(|i| format!("item {i:02}"));
        assert_eq!(matching(many, "item").len(), MAX_SUGGESTIONS);
    }
}
