//! Checkout - turn a cart into a placed order and announce it.

use crate::{
    core::{
        cart::CartLedger,
        order::{self, DeliveryType, NewOrder, OrderDetails, PICKUP_ADDRESS},
        settings::SiteSettings,
    },
    errors::{Error, Result},
    notify::{self, OrderNotice, OrderNotifier},
};
use sea_orm::DatabaseConnection;
use tracing::{info, instrument};

/// Contact details entered at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutForm {
    pub full_name: String,
    pub phone: String,
    /// Ignored for pickup orders
    pub address: String,
    pub comment: Option<String>,
    pub delivery_type: DeliveryType,
}

/// Result of a successful checkout.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub order: OrderDetails,
    /// Chats that accepted the new-order message
    pub notified: usize,
}

fn required(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        Err(Error::Validation {
            message: format!("{field} is required"),
        })
    } else {
        Ok(value.to_string())
    }
}

/// Validates the form against the cart and builds the order to record.
///
/// # Errors
/// Returns an error if the cart is empty, a required field is blank, or a
/// delivery order is below the minimum delivery amount.
pub fn prepare_order(
    cart: &CartLedger,
    form: &CheckoutForm,
    settings: &SiteSettings,
    customer_email: Option<String>,
) -> Result<NewOrder> {
    if cart.is_empty() {
        return Err(Error::EmptyCart);
    }

    let customer_name = required(&form.full_name, "Full name")?;
    let phone = required(&form.phone, "Phone")?;

    let address = match form.delivery_type {
        DeliveryType::Pickup => PICKUP_ADDRESS.to_string(),
        DeliveryType::Delivery => {
            let total = cart.total();
            if total < settings.min_delivery_amount {
                return Err(Error::BelowMinimumDelivery {
                    total,
                    minimum: settings.min_delivery_amount,
                });
            }
            required(&form.address, "Address")?
        }
    };

    Ok(NewOrder {
        customer_name,
        phone,
        address,
        comment: form
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
        delivery_type: form.delivery_type,
        customer_email,
        lines: order::build_lines(cart),
    })
}

/// Places the order for `cart` and notifies the configured chats.
///
/// The cart is left untouched; callers clear it once the receipt is shown.
/// Notification failures never fail the checkout.
///
/// # Errors
/// Returns an error if validation fails or the order cannot be stored.
#[instrument(skip_all, fields(delivery = %form.delivery_type))]
pub async fn checkout(
    db: &DatabaseConnection,
    notifier: &dyn OrderNotifier,
    settings: &SiteSettings,
    cart: &CartLedger,
    form: &CheckoutForm,
    customer_email: Option<String>,
) -> Result<CheckoutReceipt> {
    let new_order = prepare_order(cart, form, settings, customer_email)?;
    let placed = order::create_order(db, new_order).await?;
    info!(
        "Checkout placed order {} for {} ₽",
        placed.order.id, placed.order.total
    );

    let notice = OrderNotice::from_order(&placed);
    let notified = notify::dispatch_order_notice(notifier, settings, &notice).await;

    Ok(CheckoutReceipt {
        order: placed,
        notified,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{notify::MockOrderNotifier, test_utils::*};

    fn form(delivery_type: DeliveryType) -> CheckoutForm {
        CheckoutForm {
            full_name: "Иван Иванов".to_string(),
            phone: "+7 999 123-45-67".to_string(),
            address: "ул. Садовая, 5".to_string(),
            comment: Some("  ".to_string()),
            delivery_type,
        }
    }

    async fn cart_worth(db: &sea_orm::DatabaseConnection, price: i64, quantity: u32) -> Result<CartLedger> {
        let product = create_test_product(db, "Сыр сливочный", price).await?;
        let mut cart = CartLedger::new();
        for _ in 0..quantity {
            cart.add(&product, None);
        }
        Ok(cart)
    }

    fn telegram_settings() -> SiteSettings {
        SiteSettings {
            telegram_bot_token: "token".to_string(),
            telegram_chat_id: "111, 222".to_string(),
            ..SiteSettings::default()
        }
    }

    #[tokio::test]
    async fn test_pickup_checkout_places_order_and_notifies_each_chat() -> Result<()> {
        let db = setup_test_db().await?;
        let cart = cart_worth(&db, 450, 2).await?;

        let mut notifier = MockOrderNotifier::new();
        notifier
            .expect_send()
            .times(2)
            .withf(|_, _, text| text.contains("• Сыр сливочный × 2 = 900 ₽"))
            .returning(|_, _, _| Ok(()));

        let receipt = checkout(
            &db,
            &notifier,
            &telegram_settings(),
            &cart,
            &form(DeliveryType::Pickup),
            Some("ivan@example.com".to_string()),
        )
        .await?;

        assert_eq!(receipt.notified, 2);
        assert_eq!(receipt.order.order.address, PICKUP_ADDRESS);
        assert_eq!(receipt.order.order.total, 900);
        assert_eq!(receipt.order.order.status, "new");
        assert_eq!(receipt.order.order.comment, None);
        assert_eq!(receipt.order.lines[0].original_weight.as_deref(), Some("300г"));
        Ok(())
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_checkout() -> Result<()> {
        let db = setup_test_db().await?;
        let cart = cart_worth(&db, 450, 1).await?;

        let mut notifier = MockOrderNotifier::new();
        notifier.expect_send().times(2).returning(|_, _, _| {
            Err(Error::Notification {
                message: "Forbidden".to_string(),
            })
        });

        let receipt = checkout(
            &db,
            &notifier,
            &telegram_settings(),
            &cart,
            &form(DeliveryType::Pickup),
            None,
        )
        .await?;
        assert_eq!(receipt.notified, 0);
        assert!(order::get_order(&db, receipt.order.order.id).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_delivery_below_minimum_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let cart = cart_worth(&db, 450, 2).await?;
        let settings = SiteSettings::default();

        let result = prepare_order(&cart, &form(DeliveryType::Delivery), &settings, None);
        assert!(matches!(
            result,
            Err(Error::BelowMinimumDelivery {
                total: 900,
                minimum: 2500
            })
        ));

        // Pickup has no minimum
        assert!(prepare_order(&cart, &form(DeliveryType::Pickup), &settings, None).is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn test_delivery_requires_address() -> Result<()> {
        let db = setup_test_db().await?;
        let cart = cart_worth(&db, 1300, 2).await?;
        let mut delivery = form(DeliveryType::Delivery);

        let prepared = prepare_order(&cart, &delivery, &SiteSettings::default(), None)?;
        assert_eq!(prepared.address, "ул. Садовая, 5");

        delivery.address = "   ".to_string();
        let result = prepare_order(&cart, &delivery, &SiteSettings::default(), None);
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[test]
    fn test_empty_cart_and_missing_fields() {
        let settings = SiteSettings::default();
        assert!(matches!(
            prepare_order(&CartLedger::new(), &form(DeliveryType::Pickup), &settings, None),
            Err(Error::EmptyCart)
        ));

        let mut cart = CartLedger::new();
        cart.add(&test_product_model(1, "Сметана", 180), None);

        let mut missing_name = form(DeliveryType::Pickup);
        missing_name.full_name = String::new();
        assert!(prepare_order(&cart, &missing_name, &settings, None).is_err());

        let mut missing_phone = form(DeliveryType::Pickup);
        missing_phone.phone = " ".to_string();
        assert!(prepare_order(&cart, &missing_phone, &settings, None).is_err());
    }
}
