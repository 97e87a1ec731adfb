//! Catalog Discord command - browse products by category.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            format::{SHOP_COLOR, rub},
            handlers::autocomplete,
        },
        core::{product, settings},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write as _;

    /// Discord embeds hold at most 25 fields
    const MAX_FIELDS: usize = 25;

    /// Shows the catalog, optionally filtered by category.
    #[poise::command(slash_command)]
    pub async fn catalog(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Category to show (defaults to all)"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let category = category.unwrap_or_else(|| product::ALL_CATEGORIES.to_string());
        let products = product::get_products_by_category(db, &category).await?;

        if products.is_empty() {
            ctx.say(format!("No products in category '{category}' yet."))
                .await?;
            return Ok(());
        }

        let storefront = settings::load_settings(db).await?;
        let mut fields = Vec::with_capacity(products.len().min(MAX_FIELDS));
        for item in products.iter().take(MAX_FIELDS) {
            let stock = if item.in_stock() {
                format!("{} in stock", item.product.stock)
            } else {
                "out of stock".to_string()
            };
            let mut value = format!(
                "{} · {} · {stock}",
                rub(item.product.price),
                item.product.weight
            );
            for variant in &item.variants {
                let _ = write!(
                    value,
                    "\n  ↳ {}: {} · {}",
                    variant.name,
                    rub(variant.price),
                    variant.weight
                );
            }
            let title = if item.variants.is_empty() {
                item.product.name.clone()
            } else {
                format!("{} (from {})", item.product.name, rub(item.display_price()))
            };
            fields.push((title, value, false));
        }

        let shop_name = &ctx.data().config.shop.name;
        let is_image = storefront.logo.starts_with("http");
        let title = if is_image {
            shop_name.clone()
        } else {
            format!("{} {shop_name}", storefront.logo)
        };

        let mut embed = serenity::CreateEmbed::default()
            .title(title)
            .description(storefront.site_description.clone())
            .color(SHOP_COLOR)
            .fields(fields)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Delivery from {} · pickup any amount",
                rub(storefront.min_delivery_amount)
            )));
        if is_image {
            embed = embed.thumbnail(storefront.logo.clone());
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
