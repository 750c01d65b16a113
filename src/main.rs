use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::prelude::*;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use food_coach::analysis::{MealAnalyzer, VisionAnalyzer};
use food_coach::bot::{self, SharedCoach};
use food_coach::config::BotConfig;
use food_coach::localization::init_localization_from;
use food_coach::session::Coach;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();

    info!("Starting Food Coach Telegram Bot");

    let config = BotConfig::from_env().context("Invalid configuration")?;

    init_localization_from(&config.locales_dir)
        .with_context(|| format!("Failed to load locales from {}", config.locales_dir))?;

    let analyzer: Arc<dyn MealAnalyzer> = Arc::new(
        VisionAnalyzer::new(config.analysis.clone()).context("Failed to create vision API client")?,
    );
    info!(model = %config.analysis.model, "Meal analyzer ready");

    let coach: SharedCoach = Arc::new(Mutex::new(Coach::new()));

    let bot = Bot::new(config.telegram_token.clone());
    let config = Arc::new(config);

    info!("Bot initialized, starting dispatcher");

    let handler = Update::filter_message().endpoint(bot::message_handler);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![coach, analyzer, config])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
