//! Customer account commands for staff.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, format::SHOP_COLOR},
        core::auth::{self, ProfileUpdate},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Parent command for customer accounts.
    #[poise::command(
        slash_command,
        check = "crate::bot::handlers::checks::require_staff",
        subcommands("customers_search", "customers_edit")
    )]
    pub async fn customers(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Customer command. Available subcommands:\n\
            `/customers search` - Find customers\n\
            `/customers edit` - Edit a customer";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Finds customers by e-mail, name, or phone.
    #[poise::command(
        slash_command,
        rename = "search",
        check = "crate::bot::handlers::checks::require_staff"
    )]
    pub async fn customers_search(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Text to search for (omit to list everyone)"] query: Option<String>,
    ) -> Result<()> {
        let users = auth::search_users(&ctx.data().database, query.as_deref()).await?;
        if users.is_empty() {
            ctx.say("No customers found.").await?;
            return Ok(());
        }

        let fields: Vec<_> = users
            .iter()
            .take(25)
            .map(|user| {
                let badge = if user.is_admin { " 🛡️" } else { "" };
                (
                    format!("{}{badge}", user.full_name),
                    format!(
                        "{} · {} · since {}",
                        user.email,
                        user.phone.as_deref().unwrap_or("no phone"),
                        user.created_at.format("%Y-%m-%d")
                    ),
                    false,
                )
            })
            .collect();

        let embed = serenity::CreateEmbed::default()
            .title(format!("👥 Customers ({})", users.len()))
            .color(SHOP_COLOR)
            .fields(fields);
        ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
            .await?;
        Ok(())
    }

    /// Edits a customer's profile; omitted fields keep their current values.
    #[poise::command(
        slash_command,
        rename = "edit",
        check = "crate::bot::handlers::checks::require_staff"
    )]
    pub async fn customers_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Customer's current e-mail"] email: String,
        #[description = "New full name"] full_name: Option<String>,
        #[description = "New e-mail"] new_email: Option<String>,
        #[description = "New phone"] phone: Option<String>,
        #[description = "New password"] password: Option<String>,
        #[description = "Grant or revoke staff access"] admin: Option<bool>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let Some(user) = auth::find_user_by_email(db, &email).await? else {
            return Err(Error::UserNotFound { id: email });
        };

        let user_id = user.id;
        let mut updated = auth::update_user(
            db,
            user_id,
            ProfileUpdate {
                full_name: full_name.unwrap_or(user.full_name),
                email: new_email.unwrap_or(user.email),
                phone: phone.or(user.phone),
                password,
            },
        )
        .await?;
        if let Some(is_admin) = admin {
            updated = auth::set_admin(db, user_id, is_admin).await?;
        }

        ctx.send(
            poise::CreateReply::default()
                .content(format!(
                    "✅ Updated {} <{}>{}",
                    updated.full_name,
                    updated.email,
                    if updated.is_admin { " (staff)" } else { "" }
                ))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
