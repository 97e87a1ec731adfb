//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    ///
    /// This is a simple health check command that doesn't require any database operations.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = format!(
            "**{} Help**\n\
        Browse the catalog, fill your cart, and place an order right here.\n\n\
        **Shopping**\n\
        • `/catalog [category]` - Shows products, prices, and variants.\n\
        • `/cart add <product> [variant] [quantity]` - Adds a product to your cart.\n\
        • `/cart show` - Shows your cart and total.\n\
        • `/cart set <product> <quantity> [variant]` - Changes a quantity (0 removes the line).\n\
        • `/cart remove <product> [variant]` / `/cart clear` - Removes lines.\n\
        • `/checkout <name> <phone> <delivery> [address] [comment]` - Places your order.\n\n\
        **Account**\n\
        • `/account code <email>` - Gets an e-mail verification code.\n\
        • `/account register` / `/account login` / `/account logout` - Manage your session.\n\
        • `/account profile` - Shows or updates your profile.\n\
        • `/account orders` - Lists your orders.\n\n\
        **Staff**\n\
        • `/orders list|show|status|weight|price|quantity|delete` - Order back-office.\n\
        • `/summary` - What still needs to be produced.\n\
        • `/product_manage <subcommand>` - Manage the catalog.\n\
        • `/settings show|set` - Storefront settings.\n\
        • `/customers search|edit` - Customer accounts.\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.",
            ctx.data().config.shop.name
        );

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
