//! Storefront settings - branding, delivery minimum, and notification targets.
//!
//! The whole settings blob is stored as camelCase JSON under a single key in
//! `site_settings`. Saving replaces the blob; there is no merge, so the last
//! writer wins.

use crate::{
    entities::{SiteSetting, site_setting},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::{debug, info};

/// Key of the settings blob in `site_settings`
pub const SETTINGS_KEY: &str = "storefront";

/// Seasonal color scheme of the storefront.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Winter,
    Spring,
    Summer,
    Autumn,
    Holiday,
}

impl Theme {
    pub const ALL: [Self; 6] = [
        Self::Default,
        Self::Winter,
        Self::Spring,
        Self::Summer,
        Self::Autumn,
        Self::Holiday,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Winter => "winter",
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
            Self::Holiday => "holiday",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|theme| theme.as_str() == s.trim())
            .ok_or_else(|| Error::Validation {
                message: format!("Unknown theme '{s}'"),
            })
    }
}

/// Shop-wide storefront settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteSettings {
    /// Emoji, image URL, or data URL
    pub logo: String,
    pub theme: Theme,
    /// Smallest cart total accepted for delivery orders, in rubles
    pub min_delivery_amount: i64,
    pub site_description: String,
    pub telegram_bot_token: String,
    /// Comma-separated Telegram chat ids
    pub telegram_chat_id: String,
    pub farm_photos: Vec<String>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            logo: "🧀".to_string(),
            theme: Theme::Default,
            min_delivery_amount: 2500,
            site_description:
                "Сыроварня SOBKO — натуральные продукты с любовью и заботой о вашем здоровье!"
                    .to_string(),
            telegram_bot_token: String::new(),
            telegram_chat_id: String::new(),
            farm_photos: Vec::new(),
        }
    }
}

impl SiteSettings {
    /// Chat ids to notify, with blanks dropped.
    #[must_use]
    pub fn chat_ids(&self) -> Vec<String> {
        self.telegram_chat_id
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Fills an empty bot token or chat id list from the given fallbacks.
    #[must_use]
    pub fn with_fallback(mut self, bot_token: Option<String>, chat_ids: Option<String>) -> Self {
        if self.telegram_bot_token.trim().is_empty()
            && let Some(token) = bot_token
        {
            self.telegram_bot_token = token;
        }
        if self.telegram_chat_id.trim().is_empty()
            && let Some(ids) = chat_ids
        {
            self.telegram_chat_id = ids;
        }
        self
    }

    /// Applies [`Self::with_fallback`] with `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_IDS`.
    #[must_use]
    pub fn with_env_fallback(self) -> Self {
        self.with_fallback(
            std::env::var("TELEGRAM_BOT_TOKEN").ok(),
            std::env::var("TELEGRAM_CHAT_IDS").ok(),
        )
    }

    /// Sets a single field by name, parsing `value` as needed.
    ///
    /// Field names are the snake_case field names; `farm_photos` takes a
    /// comma-separated list.
    ///
    /// # Errors
    /// Returns an error for unknown fields, unknown themes, or a negative or
    /// non-numeric delivery minimum.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match field {
            "logo" => value.clone_into(&mut self.logo),
            "theme" => self.theme = value.parse()?,
            "min_delivery_amount" => {
                let amount: i64 = value.parse().map_err(|_| Error::Validation {
                    message: format!("'{value}' is not a whole number of rubles"),
                })?;
                if amount < 0 {
                    return Err(Error::InvalidAmount { amount });
                }
                self.min_delivery_amount = amount;
            }
            "site_description" => value.clone_into(&mut self.site_description),
            "telegram_bot_token" => value.clone_into(&mut self.telegram_bot_token),
            "telegram_chat_id" => value.clone_into(&mut self.telegram_chat_id),
            "farm_photos" => {
                self.farm_photos = value
                    .split(',')
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            other => {
                return Err(Error::Validation {
                    message: format!("Unknown setting '{other}'"),
                });
            }
        }
        Ok(())
    }
}

/// Loads the stored settings without environment fallback, or defaults.
///
/// # Errors
/// Returns an error if the query fails or the stored blob is not valid JSON.
pub async fn load_stored_settings(db: &DatabaseConnection) -> Result<SiteSettings> {
    let stored = SiteSetting::find()
        .filter(site_setting::Column::Key.eq(SETTINGS_KEY))
        .one(db)
        .await?;

    match stored {
        Some(row) => Ok(serde_json::from_str(&row.value)?),
        None => {
            debug!("No stored settings, using defaults");
            Ok(SiteSettings::default())
        }
    }
}

/// Loads the settings, filling Telegram credentials from the environment when unset.
///
/// # Errors
/// Returns an error if the query fails or the stored blob is not valid JSON.
pub async fn load_settings(db: &DatabaseConnection) -> Result<SiteSettings> {
    Ok(load_stored_settings(db).await?.with_env_fallback())
}

/// Replaces the stored settings blob.
///
/// # Errors
/// Returns an error if the delivery minimum is negative or the write fails.
pub async fn save_settings(db: &DatabaseConnection, settings: &SiteSettings) -> Result<()> {
    if settings.min_delivery_amount < 0 {
        return Err(Error::InvalidAmount {
            amount: settings.min_delivery_amount,
        });
    }

    let value = serde_json::to_string(settings)?;
    let now = chrono::Utc::now().naive_utc();

    let existing = SiteSetting::find()
        .filter(site_setting::Column::Key.eq(SETTINGS_KEY))
        .one(db)
        .await?;

    match existing {
        Some(row) => {
            let mut active: site_setting::ActiveModel = row.into();
            active.value = Set(value);
            active.updated_at = Set(now);
            active.update(db).await?;
        }
        None => {
            site_setting::ActiveModel {
                key: Set(SETTINGS_KEY.to_string()),
                value: Set(value),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }

    info!("Saved storefront settings");
    Ok(())
}
