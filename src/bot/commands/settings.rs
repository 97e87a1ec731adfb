//! Storefront settings commands.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            format::{SHOP_COLOR, rub, truncate},
        },
        core::settings::{self, SiteSettings},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum SettingField {
        #[name = "logo"]
        Logo,
        #[name = "theme"]
        Theme,
        #[name = "min_delivery_amount"]
        MinDeliveryAmount,
        #[name = "site_description"]
        SiteDescription,
        #[name = "telegram_bot_token"]
        TelegramBotToken,
        #[name = "telegram_chat_id"]
        TelegramChatId,
        #[name = "farm_photos"]
        FarmPhotos,
    }

    impl SettingField {
        const fn key(self) -> &'static str {
            match self {
                Self::Logo => "logo",
                Self::Theme => "theme",
                Self::MinDeliveryAmount => "min_delivery_amount",
                Self::SiteDescription => "site_description",
                Self::TelegramBotToken => "telegram_bot_token",
                Self::TelegramChatId => "telegram_chat_id",
                Self::FarmPhotos => "farm_photos",
            }
        }
    }

    fn mask_token(token: &str) -> String {
        if token.is_empty() {
            return "not set".to_string();
        }
        let tail: String = token
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("••••{tail}")
    }

    fn settings_embed(current: &SiteSettings) -> serenity::CreateEmbed {
        let photos = if current.farm_photos.is_empty() {
            "none".to_string()
        } else {
            truncate(&current.farm_photos.join("\n"), 1024)
        };
        let chats = current.chat_ids();
        serenity::CreateEmbed::default()
            .title("⚙️ Storefront settings")
            .color(SHOP_COLOR)
            .field("Logo", truncate(&current.logo, 256), true)
            .field("Theme", current.theme.to_string(), true)
            .field("Min delivery", rub(current.min_delivery_amount), true)
            .field("Description", truncate(&current.site_description, 1024), false)
            .field("Telegram bot", mask_token(&current.telegram_bot_token), true)
            .field(
                "Telegram chats",
                if chats.is_empty() {
                    "none".to_string()
                } else {
                    chats.join(", ")
                },
                true,
            )
            .field("Farm photos", photos, false)
    }

    /// Parent command for storefront settings.
    #[poise::command(
        slash_command,
        check = "crate::bot::handlers::checks::require_staff",
        subcommands("settings_show", "settings_set")
    )]
    pub async fn settings(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Settings command. Available subcommands:\n\
            `/settings show` - Show current settings\n\
            `/settings set` - Change one setting";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows the current storefront settings.
    #[poise::command(
        slash_command,
        rename = "show",
        check = "crate::bot::handlers::checks::require_staff"
    )]
    pub async fn settings_show(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let current = settings::load_settings(&ctx.data().database).await?;
        ctx.send(
            poise::CreateReply::default()
                .embed(settings_embed(&current))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Changes one storefront setting.
    ///
    /// `farm_photos` takes a comma-separated list of URLs, `theme` one of
    /// default, winter, spring, summer, autumn, holiday.
    #[poise::command(
        slash_command,
        rename = "set",
        check = "crate::bot::handlers::checks::require_staff"
    )]
    pub async fn settings_set(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Setting to change"] field: SettingField,
        #[description = "New value"] value: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let mut current = settings::load_stored_settings(db).await?;
        current.set_field(field.key(), &value)?;
        settings::save_settings(db, &current).await?;

        ctx.send(
            poise::CreateReply::default()
                .content(format!("✅ Setting `{}` updated.", field.key()))
                .embed(settings_embed(&current.with_env_fallback()))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

}

// Re-export all commands
pub use inner::*;
