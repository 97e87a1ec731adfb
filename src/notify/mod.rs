//! New-order notifications.
//!
//! When an order is placed, a Markdown summary is sent to every configured
//! Telegram chat. Delivery is best effort: each chat is tried once and failures
//! are logged, never surfaced to the customer.

pub mod telegram;

pub use telegram::TelegramNotifier;

use crate::{core::order::OrderDetails, core::settings::SiteSettings, errors::Result};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Write as _;
use tracing::{info, warn};

/// One line of a new-order message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeItem {
    pub name: String,
    pub quantity: u32,
    pub total: i64,
}

/// Everything the new-order message shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotice {
    pub order_id: i64,
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub comment: Option<String>,
    pub items: Vec<NoticeItem>,
    pub total: i64,
}

impl OrderNotice {
    #[must_use]
    pub fn from_order(details: &OrderDetails) -> Self {
        Self {
            order_id: details.order.id,
            full_name: details.order.customer_name.clone(),
            phone: details.order.phone.clone(),
            address: details.order.address.clone(),
            comment: details.order.comment.clone().filter(|c| !c.trim().is_empty()),
            items: details
                .lines
                .iter()
                .map(|line| NoticeItem {
                    name: line.display_name(),
                    quantity: line.quantity,
                    total: line.line_total(),
                })
                .collect(),
            total: details.order.total,
        }
    }

    /// Telegram Markdown body of the message.
    #[must_use]
    pub fn render(&self) -> String {
        let mut message = String::from("🧀 *Новый заказ!*\n\n");
        let _ = writeln!(message, "👤 *Клиент:* {}", self.full_name);
        let _ = writeln!(message, "📞 *Телефон:* {}", self.phone);
        let _ = writeln!(message, "📍 *Адрес:* {}", self.address);
        if let Some(comment) = &self.comment {
            let _ = writeln!(message, "💬 *Комментарий:* {comment}");
        }
        message.push_str("\n📦 *Состав заказа:*\n");
        for item in &self.items {
            let _ = writeln!(message, "• {} × {} = {} ₽", item.name, item.quantity, item.total);
        }
        let _ = write!(message, "\n💰 *Итого:* {} ₽", self.total);
        message
    }
}

/// Delivers a rendered message to one chat.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    /// Sends `text` to `chat_id` using `bot_token`.
    ///
    /// # Errors
    /// Returns an error if the request fails or is rejected.
    async fn send(&self, bot_token: &str, chat_id: &str, text: &str) -> Result<()>;
}

/// Sends `notice` to every chat in `settings`, returning how many succeeded.
///
/// Nothing is sent when the bot token or chat list is empty.
pub async fn dispatch_order_notice(
    notifier: &dyn OrderNotifier,
    settings: &SiteSettings,
    notice: &OrderNotice,
) -> usize {
    let chat_ids = settings.chat_ids();
    if settings.telegram_bot_token.trim().is_empty() || chat_ids.is_empty() {
        warn!(
            "Telegram is not configured, order {} was not announced",
            notice.order_id
        );
        return 0;
    }

    let text = notice.render();
    let mut delivered = 0;
    for chat_id in &chat_ids {
        match notifier
            .send(settings.telegram_bot_token.trim(), chat_id, &text)
            .await
        {
            Ok(()) => delivered += 1,
            Err(e) => warn!(
                "Failed to notify chat {chat_id} about order {}: {e}",
                notice.order_id
            ),
        }
    }

    info!(
        "Order {} announced to {delivered}/{} chats",
        notice.order_id,
        chat_ids.len()
    );
    delivered
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;

    fn notice(comment: Option<&str>) -> OrderNotice {
        OrderNotice {
            order_id: 12,
            full_name: "Иван Иванов".to_string(),
            phone: "+7 999 123-45-67".to_string(),
            address: "Самовывоз".to_string(),
            comment: comment.map(str::to_string),
            items: vec![
                NoticeItem {
                    name: "Сыр сливочный".to_string(),
                    quantity: 2,
                    total: 900,
                },
                NoticeItem {
                    name: "Молоко фермерское".to_string(),
                    quantity: 1,
                    total: 120,
                },
            ],
            total: 1020,
        }
    }

    fn settings(token: &str, chats: &str) -> SiteSettings {
        SiteSettings {
            telegram_bot_token: token.to_string(),
            telegram_chat_id: chats.to_string(),
            ..SiteSettings::default()
        }
    }

    #[test]
    fn test_render_message() {
        let text = notice(Some("Позвонить заранее")).render();
        assert!(text.starts_with("🧀 *Новый заказ!*\n\n👤 *Клиент:* Иван Иванов\n"));
        assert!(text.contains("📍 *Адрес:* Самовывоз\n"));
        assert!(text.contains("💬 *Комментарий:* Позвонить заранее\n"));
        assert!(text.contains("• Сыр сливочный × 2 = 900 ₽\n"));
        assert!(text.contains("• Молоко фермерское × 1 = 120 ₽\n"));
        assert!(text.ends_with("\n💰 *Итого:* 1020 ₽"));
    }

    #[test]
    fn test_render_without_comment() {
        assert!(!notice(None).render().contains("Комментарий"));
    }

    #[tokio::test]
    async fn test_dispatch_sends_once_per_chat() {
        let mut notifier = MockOrderNotifier::new();
        notifier
            .expect_send()
            .withf(|token, chat_id, _| token == "token" && chat_id == "111")
            .times(1)
            .returning(|_, _, _| Ok(()));
        notifier
            .expect_send()
            .withf(|token, chat_id, _| token == "token" && chat_id == "222")
            .times(1)
            .returning(|_, _, _| Ok(()));

        let sent = dispatch_order_notice(&notifier, &settings("token", "111, 222"), &notice(None)).await;
        assert_eq!(sent, 2);
    }

    #[tokio::test]
    async fn test_dispatch_continues_after_failure() {
        let mut notifier = MockOrderNotifier::new();
        notifier
            .expect_send()
            .withf(|token, chat_id, _| token == "token" && chat_id == "111")
            .times(1)
            .returning(|_, _, _| {
                Err(Error::Notification {
                    message: "chat not found".to_string(),
                })
            });
        notifier
            .expect_send()
            .withf(|token, chat_id, _| token == "token" && chat_id == "222")
            .times(1)
            .returning(|_, _, _| Ok(()));

        let sent = dispatch_order_notice(&notifier, &settings("token", "111,222"), &notice(None)).await;
        assert_eq!(sent, 1);
    }

    #[tokio::test]
    async fn test_dispatch_skips_when_unconfigured() {
        let mut notifier = MockOrderNotifier::new();
        notifier.expect_send().times(0);

        assert_eq!(
            dispatch_order_notice(&notifier, &settings("", "111"), &notice(None)).await,
            0
        );
        assert_eq!(
            dispatch_order_notice(&notifier, &settings("token", " , "), &notice(None)).await,
            0
        );
    }
}
