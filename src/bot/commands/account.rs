//! Account Discord commands - register, log in, and view your orders.
//!
//! Logging in links a shop session to your Discord user for as long as the bot
//! runs. Registration requires a verification code issued with `/account code`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, LinkedAccount, format},
        core::{
            auth::{self, AuthSession, ProfileUpdate, Registration},
            order,
        },
        entities::user,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    async fn reply_private(ctx: poise::Context<'_, BotData, Error>, text: String) -> Result<()> {
        ctx.send(poise::CreateReply::default().content(text).ephemeral(true))
            .await?;
        Ok(())
    }

    async fn link(ctx: poise::Context<'_, BotData, Error>, session: &AuthSession) {
        ctx.data()
            .link_account(
                ctx.author().id.get(),
                LinkedAccount {
                    user_id: session.user.id,
                    email: session.user.email.clone(),
                    token: session.token.clone(),
                },
            )
            .await;
    }

    async fn require_login(ctx: poise::Context<'_, BotData, Error>) -> Result<Option<user::Model>> {
        let user = ctx.data().linked_user(ctx.author().id.get()).await?;
        if user.is_none() {
            reply_private(
                ctx,
                "❌ You are not logged in. Use `/account login` first.".to_string(),
            )
            .await?;
        }
        Ok(user)
    }

    fn profile_embed(user: &user::Model) -> serenity::CreateEmbed {
        serenity::CreateEmbed::default()
            .title(format!("👤 {}", user.full_name))
            .color(format::SHOP_COLOR)
            .field("E-mail", user.email.clone(), true)
            .field("Phone", user.phone.clone().unwrap_or_else(|| "—".to_string()), true)
            .field(
                "Member since",
                user.created_at.format("%Y-%m-%d").to_string(),
                true,
            )
    }

    /// Parent command for your shop account.
    #[poise::command(
        slash_command,
        subcommands(
            "account_code",
            "account_register",
            "account_login",
            "account_logout",
            "account_profile",
            "account_orders"
        )
    )]
    pub async fn account(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Account command. Available subcommands:\n\
            `/account code` - Get an e-mail verification code\n\
            `/account register` - Create an account\n\
            `/account login` - Log in\n\
            `/account logout` - Log out\n\
            `/account profile` - Show or update your profile\n\
            `/account orders` - List your orders";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Issues a six-digit verification code for an e-mail address.
    #[poise::command(slash_command, rename = "code")]
    pub async fn account_code(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "E-mail to verify"] email: String,
    ) -> Result<()> {
        let code = ctx.data().codes.generate(&email).await;
        let minutes = ctx.data().config.shop.verification_code_ttl_minutes;
        reply_private(
            ctx,
            format!("🔐 Your verification code for {email} is **{code}**. It is valid for {minutes} minutes."),
        )
        .await
    }

    /// Creates an account and logs you in.
    #[poise::command(slash_command, rename = "register")]
    pub async fn account_register(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "E-mail address"] email: String,
        #[description = "Code from /account code"] code: String,
        #[description = "Password"] password: String,
        #[description = "Your full name"] full_name: String,
        #[description = "Contact phone"] phone: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        data.codes.check(&email, &code).await?;

        let session = auth::register(
            &data.database,
            Registration {
                email: email.clone(),
                password,
                full_name,
                phone,
            },
        )
        .await?;
        data.codes.consume(&email).await;
        link(ctx, &session).await;

        reply_private(
            ctx,
            format!(
                "✅ Welcome, {}! Your account is ready and you are logged in.",
                session.user.full_name
            ),
        )
        .await
    }

    /// Logs in to an existing account.
    #[poise::command(slash_command, rename = "login")]
    pub async fn account_login(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "E-mail address"] email: String,
        #[description = "Password"] password: String,
    ) -> Result<()> {
        let session = auth::login(&ctx.data().database, &email, &password).await?;
        link(ctx, &session).await;
        reply_private(
            ctx,
            format!("✅ Logged in as {}.", session.user.full_name),
        )
        .await
    }

    /// Logs out and revokes your session.
    #[poise::command(slash_command, rename = "logout")]
    pub async fn account_logout(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let Some(account) = data.unlink_account(ctx.author().id.get()).await else {
            return reply_private(ctx, "You are not logged in.".to_string()).await;
        };
        auth::logout(&data.database, &account.token).await?;
        reply_private(ctx, "👋 Logged out.".to_string()).await
    }

    /// Shows your profile, or updates it when any field is given.
    #[poise::command(slash_command, rename = "profile")]
    pub async fn account_profile(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "New full name"] full_name: Option<String>,
        #[description = "New e-mail"] email: Option<String>,
        #[description = "New phone"] phone: Option<String>,
        #[description = "New password"] password: Option<String>,
    ) -> Result<()> {
        let Some(user) = require_login(ctx).await? else {
            return Ok(());
        };

        let changing = full_name.is_some() || email.is_some() || phone.is_some() || password.is_some();
        let user = if changing {
            let updated = auth::update_user(
                &ctx.data().database,
                user.id,
                ProfileUpdate {
                    full_name: full_name.unwrap_or(user.full_name),
                    email: email.unwrap_or(user.email),
                    phone: phone.or(user.phone),
                    password,
                },
            )
            .await?;
            if let Some(account) = ctx
                .data()
                .accounts
                .write()
                .await
                .get_mut(&ctx.author().id.get())
            {
                account.email.clone_from(&updated.email);
            }
            updated
        } else {
            user
        };

        ctx.send(
            poise::CreateReply::default()
                .embed(profile_embed(&user))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Lists the orders placed while logged in.
    #[poise::command(slash_command, rename = "orders")]
    pub async fn account_orders(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let Some(user) = require_login(ctx).await? else {
            return Ok(());
        };

        let orders = order::get_orders_for_customer(&ctx.data().database, &user.email).await?;
        if orders.is_empty() {
            return reply_private(ctx, "You have no orders yet.".to_string()).await;
        }

        let fields: Vec<_> = orders.iter().take(25).map(format::order_row).collect();
        let embed = serenity::CreateEmbed::default()
            .title("📋 Your orders")
            .color(format::SHOP_COLOR)
            .fields(fields);
        ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
