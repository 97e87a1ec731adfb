//! Cart Discord commands - build up an order before checkout.
//!
//! Each Discord user has one in-memory cart. Lines are addressed by product name
//! plus optional variant name, mirroring how they were added.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            format::{SHOP_COLOR, cart_summary, rub},
            handlers::autocomplete,
        },
        core::{
            cart::LineKey,
            product::{self, CatalogProduct},
        },
        entities::product_variant,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Picks the variant to add; products with variants require a choice.
    fn choose_variant<'a>(
        item: &'a CatalogProduct,
        variant: Option<&str>,
    ) -> Result<Option<&'a product_variant::Model>> {
        match variant {
            Some(name) => item
                .find_variant(name.trim())
                .map(Some)
                .ok_or_else(|| Error::VariantNotFound {
                    product_id: item.product.id,
                    variant: name.to_string(),
                }),
            None if item.variants.is_empty() => Ok(None),
            None => {
                let names: Vec<&str> = item.variants.iter().map(|v| v.name.as_str()).collect();
                Err(Error::Validation {
                    message: format!(
                        "Choose a variant of '{}': {}",
                        item.product.name,
                        names.join(", ")
                    ),
                })
            }
        }
    }

    async fn line_key(
        ctx: poise::Context<'_, BotData, Error>,
        product_name: &str,
        variant: Option<String>,
    ) -> Result<LineKey> {
        let item = product::get_catalog_product_by_name(&ctx.data().database, product_name).await?;
        Ok(match variant {
            Some(name) => LineKey::variant(item.product.id, name.trim()),
            None => LineKey::product(item.product.id),
        })
    }

    /// Parent command for your shopping cart.
    #[poise::command(
        slash_command,
        subcommands("cart_add", "cart_show", "cart_set", "cart_remove", "cart_clear")
    )]
    pub async fn cart(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Cart command. Available subcommands:\n\
            `/cart add` - Add a product\n\
            `/cart show` - Show your cart\n\
            `/cart set` - Change a quantity\n\
            `/cart remove` - Remove a line\n\
            `/cart clear` - Empty the cart";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a product (or one of its variants) to your cart.
    #[poise::command(slash_command, rename = "add")]
    pub async fn cart_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product to add"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        product_name: String,
        #[description = "Variant (required for products with variants)"]
        #[autocomplete = "autocomplete::autocomplete_variant_name"]
        variant: Option<String>,
        #[description = "How many to add (defaults to 1)"]
        #[min = 1]
        #[max = 99]
        quantity: Option<u32>,
    ) -> Result<()> {
        let quantity = quantity.unwrap_or(1);
        if quantity == 0 {
            ctx.say("❌ Quantity must be at least 1.").await?;
            return Ok(());
        }

        let item = product::get_catalog_product_by_name(&ctx.data().database, &product_name).await?;
        if !item.in_stock() {
            ctx.say(format!("❌ '{}' is out of stock.", item.product.name))
                .await?;
            return Ok(());
        }
        let chosen = choose_variant(&item, variant.as_deref())?;

        let author = ctx.author().id.get();
        let cart = ctx
            .data()
            .with_cart(author, |cart| {
                for _ in 0..quantity {
                    cart.add(&item.product, chosen);
                }
                cart.clone()
            })
            .await;

        let label = chosen.map_or_else(
            || item.product.name.clone(),
            |v| format!("{} ({})", item.product.name, v.name),
        );
        ctx.say(format!(
            "🛒 Added {quantity} × **{label}**. Cart total: **{}** ({} items).",
            rub(cart.total()),
            cart.count()
        ))
        .await?;
        Ok(())
    }

    /// Shows the contents of your cart.
    #[poise::command(slash_command, rename = "show")]
    pub async fn cart_show(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let cart = ctx.data().cart(ctx.author().id.get()).await;
        if cart.is_empty() {
            ctx.say("Your cart is empty. Use `/catalog` and `/cart add` to fill it!")
                .await?;
            return Ok(());
        }

        let embed = serenity::CreateEmbed::default()
            .title("🛒 Your cart")
            .color(SHOP_COLOR)
            .description(cart_summary(&cart));
        ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
            .await?;
        Ok(())
    }

    /// Sets the quantity of a cart line; 0 removes it.
    #[poise::command(slash_command, rename = "set")]
    pub async fn cart_set(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product in your cart"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        product_name: String,
        #[description = "New quantity (0 removes the line)"]
        #[max = 99]
        quantity: u32,
        #[description = "Variant of the line, if any"]
        #[autocomplete = "autocomplete::autocomplete_variant_name"]
        variant: Option<String>,
    ) -> Result<()> {
        let key = line_key(ctx, &product_name, variant).await?;
        let updated = ctx
            .data()
            .with_cart(ctx.author().id.get(), |cart| {
                cart.update_quantity(&key, quantity)
                    .then(|| cart.clone())
            })
            .await;

        let Some(cart) = updated else {
            return Err(Error::CartLineNotFound);
        };
        ctx.say(format!(
            "✅ Cart updated. Total: **{}** ({} items).",
            rub(cart.total()),
            cart.count()
        ))
        .await?;
        Ok(())
    }

    /// Removes one line from your cart.
    #[poise::command(slash_command, rename = "remove")]
    pub async fn cart_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product to remove"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        product_name: String,
        #[description = "Variant of the line, if any"]
        #[autocomplete = "autocomplete::autocomplete_variant_name"]
        variant: Option<String>,
    ) -> Result<()> {
        let key = line_key(ctx, &product_name, variant).await?;
        let removed = ctx
            .data()
            .with_cart(ctx.author().id.get(), |cart| cart.remove(&key))
            .await;

        if !removed {
            return Err(Error::CartLineNotFound);
        }
        ctx.say(format!("🗑️ Removed '{product_name}' from your cart."))
            .await?;
        Ok(())
    }

    /// Empties your cart.
    #[poise::command(slash_command, rename = "clear")]
    pub async fn cart_clear(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.data()
            .with_cart(ctx.author().id.get(), |cart| cart.clear())
            .await;
        ctx.say("🗑️ Your cart is now empty.").await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
