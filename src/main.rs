use dairy_shop::{
    bot::{BotData, framework},
    config::{self, database},
    core::product,
    errors::{Error, Result},
    notify::TelegramNotifier,
};
use dotenvy::dotenv;
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load shop options and the seed catalog
    let app_config = Arc::new(config::shop::load_app_configuration()?);

    // 4. Connect and create tables
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Seed the catalog on first start
    let seeded = product::seed_catalog(&db, &app_config.products)
        .await
        .inspect_err(|e| error!("Failed to seed catalog: {e}"))?;
    if seeded > 0 {
        info!("Seeded {seeded} products");
    }

    // 6. Run the bot
    // DISCORD_BOT_TOKEN is loaded here, directly before use, not stored in AppConfig
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    let staff_ids = config::staff::get_staff_ids();
    if staff_ids.is_empty() {
        info!("SHOP_STAFF_IDS is empty; only admin accounts can use staff commands");
    }
    let notifier = Arc::new(TelegramNotifier::new(
        app_config.shop.telegram_api_base.clone(),
    ));
    let data = BotData::new(db, Arc::clone(&app_config), staff_ids, notifier);

    framework::run_bot(token, data).await.map_err(Error::from)?;

    Ok(())
}
