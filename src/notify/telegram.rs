//! Telegram Bot API client for order notifications.

use super::OrderNotifier;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Sends messages through `sendMessage`.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    api_base: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramNotifier {
    /// Creates a client for the API at `api_base`, e.g. `"https://api.telegram.org"`.
    #[must_use]
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    fn send_message_url(&self, bot_token: &str) -> String {
        format!("{}/bot{bot_token}/sendMessage", self.api_base)
    }
}

#[async_trait]
impl OrderNotifier for TelegramNotifier {
    async fn send(&self, bot_token: &str, chat_id: &str, text: &str) -> Result<()> {
        let response = self
            .http
            .post(self.send_message_url(bot_token))
            .form(&[
                ("chat_id", chat_id),
                ("text", text),
                ("parse_mode", "Markdown"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let parsed: Option<ApiResponse> = serde_json::from_str(&body).ok();

        match parsed {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => {
                debug!("Telegram accepted message for chat {chat_id}");
                Ok(())
            }
            Some(ApiResponse {
                description: Some(description),
                ..
            }) => Err(Error::Notification {
                message: format!("{status}: {description}"),
            }),
            _ => Err(Error::Notification {
                message: format!("sendMessage failed with status {status}: {body}"),
            }),
        }
    }
}
