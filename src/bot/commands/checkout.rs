//! Checkout Discord command - place the order for your cart.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, format},
        core::{
            checkout::{self, CheckoutForm},
            order::DeliveryType,
            settings,
        },
        errors::{Error, Result},
    };
    use tracing::info;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum DeliveryChoice {
        #[name = "Delivery"]
        Delivery,
        #[name = "Pickup"]
        Pickup,
    }

    impl From<DeliveryChoice> for DeliveryType {
        fn from(choice: DeliveryChoice) -> Self {
            match choice {
                DeliveryChoice::Delivery => Self::Delivery,
                DeliveryChoice::Pickup => Self::Pickup,
            }
        }
    }

    /// Places an order for everything in your cart.
    ///
    /// If you are logged in with `/account login`, the order is added to your
    /// order history.
    #[poise::command(slash_command)]
    pub async fn checkout(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Your full name"] full_name: String,
        #[description = "Contact phone"] phone: String,
        #[description = "Delivery or pickup"] delivery: DeliveryChoice,
        #[description = "Delivery address (required for delivery)"] address: Option<String>,
        #[description = "Anything we should know"] comment: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let author = ctx.author().id.get();
        let cart = data.cart(author).await;
        if cart.is_empty() {
            return Err(Error::EmptyCart);
        }

        ctx.defer().await?;

        let storefront = settings::load_settings(&data.database).await?;
        let customer_email = data.linked_user(author).await?.map(|user| user.email);
        let form = CheckoutForm {
            full_name,
            phone,
            address: address.unwrap_or_default(),
            comment,
            delivery_type: delivery.into(),
        };

        let receipt = checkout::checkout(
            &data.database,
            data.notifier.as_ref(),
            &storefront,
            &cart,
            &form,
            customer_email,
        )
        .await?;

        data.with_cart(author, |live| live.subtract(&cart)).await;
        info!(
            "Discord user {author} placed order {}",
            receipt.order.order.id
        );

        let embed = format::order_embed(&receipt.order, false)
            .description("🧀 Thank you! Your order has been received and we will contact you soon.");
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
