//! Product Discord commands - `product_manage` for maintaining the catalog.
//!
//! Products are addressed by their exact name; autocomplete suggests existing
//! names. Prices are whole rubles and weights are free text such as "300г".

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            format::{SHOP_COLOR, rub},
            handlers::autocomplete,
        },
        core::{
            pricing,
            product::{self, ProductInput},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write as _;

    /// Parent command for managing the catalog.
    #[poise::command(
        slash_command,
        check = "crate::bot::handlers::checks::require_staff",
        subcommands(
            "product_add",
            "product_list",
            "product_update",
            "product_stock",
            "product_delete",
            "variant_add",
            "variant_remove"
        )
    )]
    pub async fn product_manage(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Product management command. Available subcommands:\n\
            `/product_manage add` - Add a new product\n\
            `/product_manage list` - List all products\n\
            `/product_manage update` - Update a product\n\
            `/product_manage stock` - Set a product's stock\n\
            `/product_manage delete` - Delete a product\n\
            `/product_manage variant_add` - Add a variant\n\
            `/product_manage variant_remove` - Remove a variant";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a new product to the catalog.
    #[poise::command(
        slash_command,
        rename = "add",
        check = "crate::bot::handlers::checks::require_staff"
    )]
    pub async fn product_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Unique product name (e.g., 'Сыр сливочный')"] name: String,
        #[description = "Price in rubles"] price: i64,
        #[description = "Weight of one unit (e.g., '300г')"] weight: String,
        #[description = "Category (e.g., 'cheese')"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: String,
        #[description = "Units in stock"] stock: i64,
        #[description = "Image URL"] image: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let created = product::create_product(
            db,
            ProductInput {
                name,
                price,
                weight,
                image: image.unwrap_or_default(),
                category,
                stock,
            },
        )
        .await?;

        ctx.say(format!(
            "✅ Product '{}' added at **{}** for {} ({} in stock).",
            created.name,
            rub(created.price),
            created.weight,
            created.stock
        ))
        .await?;
        Ok(())
    }

    /// Lists all products with their variants.
    #[poise::command(
        slash_command,
        rename = "list",
        check = "crate::bot::handlers::checks::require_staff"
    )]
    pub async fn product_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let products = product::get_all_products(&ctx.data().database).await?;

        if products.is_empty() {
            ctx.say("No products have been defined yet. Use `/product_manage add` to create some!")
                .await?;
            return Ok(());
        }

        let mut embed_fields = Vec::new();
        for item in products.iter().take(25) {
            let prod = &item.product;
            let field_name = format!("{} ({})", prod.name, rub(prod.price));
            let mut field_value = format!(
                "{} · {} · stock {}",
                prod.weight, prod.category, prod.stock
            );
            if let Some(per_100g) = pricing::price_per_100g(prod.price, &prod.weight) {
                let _ = write!(field_value, " · {}/100г", rub(per_100g));
            }
            for variant in &item.variants {
                let _ = write!(
                    field_value,
                    "\n  ↳ {}: {} · {}",
                    variant.name,
                    rub(variant.price),
                    variant.weight
                );
            }
            embed_fields.push((field_name, field_value, false));
        }

        let list_embed = serenity::CreateEmbed::default()
            .title("**Product List**")
            .color(SHOP_COLOR)
            .fields(embed_fields);

        ctx.send(poise::CreateReply::default().embed(list_embed))
            .await?;
        Ok(())
    }

    /// Updates a product; omitted fields keep their current values.
    #[poise::command(
        slash_command,
        rename = "update",
        check = "crate::bot::handlers::checks::require_staff"
    )]
    pub async fn product_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the product to update"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        name: String,
        #[description = "New name"] new_name: Option<String>,
        #[description = "New price in rubles"] price: Option<i64>,
        #[description = "New weight"] weight: Option<String>,
        #[description = "New category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: Option<String>,
        #[description = "New stock"] stock: Option<i64>,
        #[description = "New image URL"] image: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let Some(existing) = product::get_product_by_name(db, &name).await? else {
            ctx.say(format!("❌ Product '{name}' not found.")).await?;
            return Ok(());
        };

        let input = ProductInput {
            name: new_name.unwrap_or(existing.name),
            price: price.unwrap_or(existing.price),
            weight: weight.unwrap_or(existing.weight),
            image: image.unwrap_or(existing.image),
            category: category.unwrap_or(existing.category),
            stock: stock.unwrap_or(existing.stock),
        };
        let updated = product::update_product(db, existing.id, input).await?;

        ctx.say(format!(
            "✅ Product '{}' updated: **{}** for {}, {} in stock.",
            updated.name,
            rub(updated.price),
            updated.weight,
            updated.stock
        ))
        .await?;
        Ok(())
    }

    /// Sets how many units of a product are in stock.
    #[poise::command(
        slash_command,
        rename = "stock",
        check = "crate::bot::handlers::checks::require_staff"
    )]
    pub async fn product_stock(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the product"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        name: String,
        #[description = "Units in stock"] stock: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let Some(existing) = product::get_product_by_name(db, &name).await? else {
            ctx.say(format!("❌ Product '{name}' not found.")).await?;
            return Ok(());
        };

        let updated = product::set_stock(db, existing.id, stock).await?;
        ctx.say(format!(
            "📦 '{}' now has {} in stock.",
            updated.name, updated.stock
        ))
        .await?;
        Ok(())
    }

    /// Deletes a product and its variants.
    #[poise::command(
        slash_command,
        rename = "delete",
        check = "crate::bot::handlers::checks::require_staff"
    )]
    pub async fn product_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the product to delete"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        name: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let Some(existing) = product::get_product_by_name(db, &name).await? else {
            ctx.say(format!("❌ Product '{name}' not found.")).await?;
            return Ok(());
        };

        product::delete_product(db, existing.id).await?;
        ctx.say(format!("✅ Product '{name}' has been deleted."))
            .await?;
        Ok(())
    }

    /// Adds a variant (flavor or size) to a product.
    #[poise::command(
        slash_command,
        rename = "variant_add",
        check = "crate::bot::handlers::checks::require_staff"
    )]
    pub async fn variant_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product to extend"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        product_name: String,
        #[description = "Variant name (e.g., 'с травами')"] name: String,
        #[description = "Variant price in rubles"] price: i64,
        #[description = "Variant weight"] weight: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let Some(existing) = product::get_product_by_name(db, &product_name).await? else {
            ctx.say(format!("❌ Product '{product_name}' not found."))
                .await?;
            return Ok(());
        };

        let variant = product::add_variant(db, existing.id, name, price, weight).await?;
        ctx.say(format!(
            "✅ Variant '{}' added to '{}' at **{}** for {}.",
            variant.name,
            existing.name,
            rub(variant.price),
            variant.weight
        ))
        .await?;
        Ok(())
    }

    /// Removes a variant from a product.
    #[poise::command(
        slash_command,
        rename = "variant_remove",
        check = "crate::bot::handlers::checks::require_staff"
    )]
    pub async fn variant_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product to change"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        product_name: String,
        #[description = "Variant to remove"]
        #[autocomplete = "autocomplete::autocomplete_variant_name"]
        name: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let Some(existing) = product::get_product_by_name(db, &product_name).await? else {
            ctx.say(format!("❌ Product '{product_name}' not found."))
                .await?;
            return Ok(());
        };

        product::remove_variant(db, existing.id, name.trim()).await?;
        ctx.say(format!(
            "🗑️ Variant '{name}' removed from '{}'.",
            existing.name
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
