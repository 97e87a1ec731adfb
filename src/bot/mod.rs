//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the shop, including all slash
//! commands, autocomplete handlers, and the shared per-process state (carts,
//! linked accounts, verification codes) that commands operate on.

/// Discord command implementations (catalog, cart, account, staff back-office)
pub mod commands;
/// Reply formatting shared by commands
pub mod format;
/// Framework setup and error handling
pub mod framework;
/// Discord interaction handlers (autocomplete, staff checks)
pub mod handlers;

use crate::{
    config::AppConfig,
    core::{auth, cart::CartLedger, verification::VerificationCodes},
    entities::user,
    errors::{Error, Result},
    notify::OrderNotifier,
};
use sea_orm::DatabaseConnection;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tokio::sync::RwLock;
use tracing::debug;

/// A Discord user's logged-in shop account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedAccount {
    pub user_id: i64,
    pub email: String,
    pub token: String,
}

/// Shared data available to all bot commands.
///
/// Carts, linked accounts, and pending verification codes are held in memory
/// and are lost when the bot restarts.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Application configuration loaded at startup
    pub config: Arc<AppConfig>,
    /// Discord ids allowed to use staff commands
    pub staff_ids: HashSet<u64>,
    /// Pending cart per Discord user
    pub carts: RwLock<HashMap<u64, CartLedger>>,
    /// Logged-in shop account per Discord user
    pub accounts: RwLock<HashMap<u64, LinkedAccount>>,
    /// Pending e-mail verification codes
    pub codes: VerificationCodes,
    /// New-order notification channel
    pub notifier: Arc<dyn OrderNotifier>,
}

impl BotData {
    /// Creates the shared context for all commands.
    #[must_use]
    pub fn new(
        database: DatabaseConnection,
        config: Arc<AppConfig>,
        staff_ids: HashSet<u64>,
        notifier: Arc<dyn OrderNotifier>,
    ) -> Self {
        let codes = VerificationCodes::with_ttl_minutes(config.shop.verification_code_ttl_minutes);
        Self {
            database,
            config,
            staff_ids,
            carts: RwLock::new(HashMap::new()),
            accounts: RwLock::new(HashMap::new()),
            codes,
            notifier,
        }
    }

    /// Copy of the user's cart (empty if they have none).
    pub async fn cart(&self, discord_id: u64) -> CartLedger {
        self.carts
            .read()
            .await
            .get(&discord_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Runs `f` against the user's cart, creating it if needed.
    pub async fn with_cart<R>(&self, discord_id: u64, f: impl FnOnce(&mut CartLedger) -> R) -> R {
        let mut carts = self.carts.write().await;
        f(carts.entry(discord_id).or_default())
    }

    /// Links a shop session to a Discord user, replacing any previous link.
    pub async fn link_account(&self, discord_id: u64, account: LinkedAccount) {
        self.accounts.write().await.insert(discord_id, account);
    }

    /// Removes and returns the user's linked account.
    pub async fn unlink_account(&self, discord_id: u64) -> Option<LinkedAccount> {
        self.accounts.write().await.remove(&discord_id)
    }

    /// Resolves the user's linked account against the session store.
    ///
    /// A link whose session has expired or been revoked is dropped.
    ///
    /// # Errors
    /// Returns an error if the session lookup fails.
    pub async fn linked_user(&self, discord_id: u64) -> Result<Option<user::Model>> {
        let Some(account) = self.accounts.read().await.get(&discord_id).cloned() else {
            return Ok(None);
        };

        match auth::verify_token(&self.database, &account.token).await {
            Ok(user) => Ok(Some(user)),
            Err(Error::InvalidSession) => {
                debug!("Dropping stale account link for Discord user {discord_id}");
                self.unlink_account(discord_id).await;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Staff are the configured Discord ids plus users linked to an admin account.
    ///
    /// # Errors
    /// Returns an error if the session lookup fails.
    pub async fn is_staff(&self, discord_id: u64) -> Result<bool> {
        if self.staff_ids.contains(&discord_id) {
            return Ok(true);
        }
        Ok(self
            .linked_user(discord_id)
            .await?
            .is_some_and(|user| user.is_admin))
    }
}

pub use commands::*;
pub use handlers::*;
