//! Reply formatting shared by commands.

use crate::core::{
    cart::CartLedger,
    order::{OrderDetails, OrderStatus},
    pricing,
};
use poise::serenity_prelude as serenity;
use std::fmt::Write as _;

/// Embed accent color
pub const SHOP_COLOR: u32 = 0x00F5_A623;

/// Formats a whole-ruble amount, e.g. "450 ₽".
#[must_use]
pub fn rub(amount: i64) -> String {
    format!("{amount} ₽")
}

#[must_use]
pub const fn status_emoji(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::New => "🆕",
        OrderStatus::Preparing => "👩‍🍳",
        OrderStatus::Ready => "📦",
        OrderStatus::Completed => "✅",
    }
}

/// Status with emoji, falling back to the raw value for unknown statuses.
#[must_use]
pub fn status_label(details: &OrderDetails) -> String {
    details.status().map_or_else(
        |_| details.order.status.clone(),
        |status| format!("{} {}", status_emoji(status), status.label()),
    )
}

/// Numbered cart lines plus the total.
#[must_use]
pub fn cart_summary(cart: &CartLedger) -> String {
    let mut text = String::new();
    for (index, item) in cart.lines().iter().enumerate() {
        let name = match &item.variant_name {
            Some(variant) => format!("{} ({variant})", item.name),
            None => item.name.clone(),
        };
        let _ = writeln!(
            text,
            "{}. **{name}** {} × {} = {}",
            index + 1,
            item.weight,
            item.quantity,
            rub(item.line_total())
        );
    }
    let _ = write!(
        text,
        "\n**Total:** {} ({} items)",
        rub(cart.total()),
        cart.count()
    );
    text
}

/// Numbered order lines; with `staff` set, each line shows its per-100g baseline.
#[must_use]
pub fn order_lines(details: &OrderDetails, staff: bool) -> String {
    let mut text = String::new();
    for (index, line) in details.lines.iter().enumerate() {
        let _ = write!(
            text,
            "{}. **{}** {} × {} = {}",
            index + 1,
            line.display_name(),
            line.weight,
            line.quantity,
            rub(line.line_total())
        );
        if staff
            && let Some(per_100g) = pricing::price_per_100g(line.base_price(), line.base_weight())
        {
            let _ = write!(text, " _(base {}/100г)_", rub(per_100g));
        }
        text.push('\n');
    }
    text
}

/// Full order card.
#[must_use]
pub fn order_embed(details: &OrderDetails, staff: bool) -> serenity::CreateEmbed {
    let order = &details.order;
    let mut embed = serenity::CreateEmbed::default()
        .title(format!("Order #{}", order.id))
        .color(SHOP_COLOR)
        .field("Status", status_label(details), true)
        .field("Total", rub(order.total), true)
        .field("Placed", order.date.format("%Y-%m-%d %H:%M UTC").to_string(), true)
        .field(
            "Customer",
            format!("{}\n{}", order.customer_name, order.phone),
            true,
        )
        .field(
            format!("Address ({})", order.delivery_type),
            order.address.clone(),
            true,
        );

    if let Some(comment) = &order.comment {
        embed = embed.field("Comment", comment.clone(), false);
    }

    let lines = order_lines(details, staff);
    embed = embed.field("Items", truncate(&lines, 1024), false);
    if staff {
        embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
            "version {}",
            order.version
        )));
    }
    embed
}

/// One-line order summary for lists.
#[must_use]
pub fn order_row(details: &OrderDetails) -> (String, String, bool) {
    let order = &details.order;
    (
        format!("#{} · {} · {}", order.id, order.customer_name, rub(order.total)),
        format!(
            "{} · {} · {} items",
            status_label(details),
            order.date.format("%Y-%m-%d"),
            details.lines.len()
        ),
        false,
    )
}

/// Cuts `text` to at most `max` characters, marking the cut.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
