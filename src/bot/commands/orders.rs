//! Staff order commands - review orders, record actual weights, and track status.
//!
//! Line numbers are 1-based as shown by `/orders show`. Every edit accepts an
//! optional `version` (shown in the order footer); when given, the edit is
//! rejected if someone else changed the order since.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, format},
        core::{
            order::{self, LineEdit, OrderDetails, OrderStatus},
            summary,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write as _;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum StatusChoice {
        #[name = "New"]
        New,
        #[name = "Preparing"]
        Preparing,
        #[name = "Ready for pickup"]
        Ready,
        #[name = "Completed"]
        Completed,
    }

    impl From<StatusChoice> for OrderStatus {
        fn from(choice: StatusChoice) -> Self {
            match choice {
                StatusChoice::New => Self::New,
                StatusChoice::Preparing => Self::Preparing,
                StatusChoice::Ready => Self::Ready,
                StatusChoice::Completed => Self::Completed,
            }
        }
    }

    fn line_index(line: u32) -> Result<usize> {
        line.checked_sub(1)
            .and_then(|index| usize::try_from(index).ok())
            .ok_or_else(|| Error::Validation {
                message: "Line numbers start at 1".to_string(),
            })
    }

    async fn show_updated(
        ctx: poise::Context<'_, BotData, Error>,
        headline: String,
        details: &OrderDetails,
    ) -> Result<()> {
        let embed = format::order_embed(details, true).description(headline);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    async fn edit_line(
        ctx: poise::Context<'_, BotData, Error>,
        order_id: i64,
        line: u32,
        edit: LineEdit,
        version: Option<i32>,
    ) -> Result<()> {
        let index = line_index(line)?;
        let updated =
            order::update_line(&ctx.data().database, order_id, index, edit, version).await?;
        show_updated(
            ctx,
            format!(
                "✅ Line {line} updated. New total: **{}**",
                format::rub(updated.order.total)
            ),
            &updated,
        )
        .await
    }

    /// Parent command for the order back-office.
    #[poise::command(
        slash_command,
        check = "crate::bot::handlers::checks::require_staff",
        subcommands(
            "orders_list",
            "orders_show",
            "orders_status",
            "orders_weight",
            "orders_price",
            "orders_quantity",
            "orders_delete"
        )
    )]
    pub async fn orders(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Order management command. Available subcommands:\n\
            `/orders list` - List orders\n\
            `/orders show` - Show one order\n\
            `/orders status` - Change an order's status\n\
            `/orders weight` - Record the actual weight of a line\n\
            `/orders price` - Set the unit price of a line\n\
            `/orders quantity` - Set the quantity of a line\n\
            `/orders delete` - Delete an order";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Lists orders, newest first.
    #[poise::command(
        slash_command,
        rename = "list",
        check = "crate::bot::handlers::checks::require_staff"
    )]
    pub async fn orders_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only orders with this status"] status: Option<StatusChoice>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let orders = match status {
            Some(choice) => order::get_orders_by_status(db, &[choice.into()]).await?,
            None => order::get_all_orders(db).await?,
        };

        if orders.is_empty() {
            ctx.say("No orders found.").await?;
            return Ok(());
        }

        let shown = orders.len().min(25);
        let fields: Vec<_> = orders.iter().take(shown).map(format::order_row).collect();
        let embed = serenity::CreateEmbed::default()
            .title("📋 Orders")
            .color(format::SHOP_COLOR)
            .fields(fields)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Showing {shown} of {}",
                orders.len()
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows an order with its lines.
    #[poise::command(
        slash_command,
        rename = "show",
        check = "crate::bot::handlers::checks::require_staff"
    )]
    pub async fn orders_show(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order number"] order_id: i64,
    ) -> Result<()> {
        let details = order::get_order(&ctx.data().database, order_id)
            .await?
            .ok_or(Error::OrderNotFound { id: order_id })?;
        ctx.send(poise::CreateReply::default().embed(format::order_embed(&details, true)))
            .await?;
        Ok(())
    }

    /// Changes the status of an order.
    #[poise::command(
        slash_command,
        rename = "status",
        check = "crate::bot::handlers::checks::require_staff"
    )]
    pub async fn orders_status(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order number"] order_id: i64,
        #[description = "New status"] status: StatusChoice,
        #[description = "Version you last saw (optional)"] version: Option<i32>,
    ) -> Result<()> {
        let data = ctx.data();
        let status = OrderStatus::from(status);
        let updated = order::update_status(
            &data.database,
            order_id,
            status,
            version,
            data.config.shop.strict_status_transitions,
        )
        .await?;
        show_updated(
            ctx,
            format!(
                "{} Order #{order_id} is now **{}**",
                format::status_emoji(status),
                status.label()
            ),
            &updated,
        )
        .await
    }

    /// Records the actual weight of a line and reprices it.
    #[poise::command(
        slash_command,
        rename = "weight",
        check = "crate::bot::handlers::checks::require_staff"
    )]
    pub async fn orders_weight(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order number"] order_id: i64,
        #[description = "Line number"] line: u32,
        #[description = "Actual weight (e.g., 320г)"] weight: String,
        #[description = "Version you last saw (optional)"] version: Option<i32>,
    ) -> Result<()> {
        edit_line(ctx, order_id, line, LineEdit::Weight(weight), version).await
    }

    /// Sets the unit price of a line.
    #[poise::command(
        slash_command,
        rename = "price",
        check = "crate::bot::handlers::checks::require_staff"
    )]
    pub async fn orders_price(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order number"] order_id: i64,
        #[description = "Line number"] line: u32,
        #[description = "Unit price in rubles"] price: i64,
        #[description = "Version you last saw (optional)"] version: Option<i32>,
    ) -> Result<()> {
        edit_line(ctx, order_id, line, LineEdit::Price(price), version).await
    }

    /// Sets the quantity of a line.
    #[poise::command(
        slash_command,
        rename = "quantity",
        check = "crate::bot::handlers::checks::require_staff"
    )]
    pub async fn orders_quantity(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order number"] order_id: i64,
        #[description = "Line number"] line: u32,
        #[description = "New quantity (at least 1)"] quantity: u32,
        #[description = "Version you last saw (optional)"] version: Option<i32>,
    ) -> Result<()> {
        edit_line(ctx, order_id, line, LineEdit::Quantity(quantity), version).await
    }

    /// Deletes an order permanently.
    #[poise::command(
        slash_command,
        rename = "delete",
        check = "crate::bot::handlers::checks::require_staff"
    )]
    pub async fn orders_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order number"] order_id: i64,
    ) -> Result<()> {
        order::delete_order(&ctx.data().database, order_id).await?;
        ctx.say(format!("🗑️ Order #{order_id} has been deleted."))
            .await?;
        Ok(())
    }

    /// Shows how much of each product active orders still need.
    #[poise::command(slash_command, check = "crate::bot::handlers::checks::require_staff")]
    pub async fn summary(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let needs = summary::get_production_needs(&ctx.data().database).await?;
        if needs.is_empty() {
            ctx.say("✅ Nothing to produce: there are no new or preparing orders.")
                .await?;
            return Ok(());
        }

        let mut text = String::new();
        for need in &needs {
            let _ = writeln!(text, "• **{}** × {}", need.name, need.quantity);
        }
        let embed = serenity::CreateEmbed::default()
            .title("🧀 Production needs")
            .description(format::truncate(&text, 4096))
            .color(format::SHOP_COLOR)
            .footer(serenity::CreateEmbedFooter::new(
                "Counts new and preparing orders",
            ));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

}

// Re-export all commands
pub use inner::*;
