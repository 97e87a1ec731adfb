//! Command checks.

use crate::{bot::BotData, errors::Error};

/// Passes for configured staff ids and users linked to an admin account.
///
/// # Errors
/// Returns an error if the account lookup fails.
pub async fn require_staff(ctx: poise::Context<'_, BotData, Error>) -> Result<bool, Error> {
    ctx.data().is_staff(ctx.author().id.get()).await
}
