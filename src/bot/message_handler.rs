//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::FileMeta;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

// Import localization
use crate::localization::{t_args_lang, t_lang};

// Import core and analysis types
use crate::analysis::MealAnalyzer;
use crate::analysis_errors::AnalysisError;
use crate::config::BotConfig;
use crate::session::Coach;

// Import dialogue manager functions
use super::dialogue_manager::send_outgoing;

// Import UI builder functions
use super::ui_builder::format_meal_summary;

/// Coach state shared by all handler tasks
pub type SharedCoach = Arc<Mutex<Coach>>;

const HELP_COMMAND: &str = "/help";

fn user_language(msg: &Message) -> Option<&str> {
    msg.from
        .as_ref()
        .and_then(|user| user.language_code.as_ref())
        .map(|s| s.as_str())
}

pub async fn download_file(bot: &Bot, file_id: teloxide::types::FileId) -> Result<Vec<u8>> {
    let file = bot.get_file(file_id).await?;
    let url = format!(
        "https://api.telegram.org/file/bot{}/{}",
        bot.token(),
        file.path
    );

    let response = reqwest::get(&url).await?.error_for_status()?;
    let bytes = response.bytes().await?;

    Ok(bytes.to_vec())
}

fn analysis_error_message(error: &AnalysisError, language_code: Option<&str>) -> String {
    match error {
        AnalysisError::Validation(_) => t_lang("error-analysis-validation", language_code),
        AnalysisError::Timeout(_) => t_lang("error-analysis-timeout", language_code),
        AnalysisError::CircuitOpen => t_lang("error-analysis-unavailable", language_code),
        AnalysisError::Request(_) | AnalysisError::MalformedResponse(_) => {
            t_lang("error-analysis-failed", language_code)
        }
    }
}

/// Download an image, analyze it and store the detected meal
pub async fn download_and_analyze_image(
    bot: &Bot,
    file: &FileMeta,
    chat_id: ChatId,
    language_code: Option<&str>,
    coach: SharedCoach,
    analyzer: Arc<dyn MealAnalyzer>,
    config: &BotConfig,
) -> Result<()> {
    let max_file_size = config.analysis.max_file_size;
    if u64::from(file.size) > max_file_size {
        warn!(user_id = %chat_id, size = file.size, "Photo rejected as too large");
        let limit_mb = (max_file_size / (1024 * 1024)).to_string();
        bot.send_message(
            chat_id,
            t_args_lang("photo-too-large", &[("limit", &limit_mb)], language_code),
        )
        .await?;
        return Ok(());
    }

    bot.send_message(chat_id, t_lang("photo-analyzing", language_code))
        .await?;

    let image = match download_file(bot, file.id.clone()).await {
        Ok(bytes) => {
            debug!(user_id = %chat_id, bytes = bytes.len(), "Image downloaded successfully");
            bytes
        }
        Err(e) => {
            error!(user_id = %chat_id, error = %e, "Failed to download image for user");
            bot.send_message(chat_id, t_lang("error-download-failed", language_code))
                .await?;
            return Ok(());
        }
    };

    let result = analyzer.analyze(&image).await;
    let reply = match &result {
        Ok(meal) => {
            info!(user_id = %chat_id, dish = %meal.dish_name, "Meal detected");
            format_meal_summary(meal, language_code)
        }
        Err(e) => {
            error!(user_id = %chat_id, error = %e, "Meal analysis failed for user");
            analysis_error_message(e, language_code)
        }
    };

    coach.lock().await.record_analysis(chat_id.0, result);
    bot.send_message(chat_id, reply).await?;

    Ok(())
}

async fn handle_text_message(bot: &Bot, msg: &Message, coach: SharedCoach) -> Result<()> {
    if let Some(text) = msg.text() {
        debug!(user_id = %msg.chat.id, message_length = text.len(), "Received text message from user");
        let language_code = user_language(msg);

        if text.trim() == HELP_COMMAND {
            let help_message = [
                t_lang("help-text", language_code),
                t_lang("help-commands", language_code),
            ]
            .join("\n\n");
            bot.send_message(msg.chat.id, help_message).await?;
            return Ok(());
        }

        let outgoing = coach.lock().await.handle_text(msg.chat.id.0, text);
        send_outgoing(bot, msg.chat.id, &outgoing, language_code).await?;
    }
    Ok(())
}

async fn handle_photo_message(
    bot: &Bot,
    msg: &Message,
    coach: SharedCoach,
    analyzer: Arc<dyn MealAnalyzer>,
    config: &BotConfig,
) -> Result<()> {
    debug!(user_id = %msg.chat.id, "Received photo message from user");

    if let Some(largest_photo) = msg.photo().and_then(|photos| photos.last()) {
        download_and_analyze_image(
            bot,
            &largest_photo.file,
            msg.chat.id,
            user_language(msg),
            coach,
            analyzer,
            config,
        )
        .await?;
    }
    Ok(())
}

async fn handle_document_message(
    bot: &Bot,
    msg: &Message,
    coach: SharedCoach,
    analyzer: Arc<dyn MealAnalyzer>,
    config: &BotConfig,
) -> Result<()> {
    let language_code = user_language(msg);

    if let Some(doc) = msg.document() {
        let is_image = doc
            .mime_type
            .as_ref()
            .is_some_and(|mime| mime.to_string().starts_with("image/"));

        if is_image {
            debug!(user_id = %msg.chat.id, "Received image document from user");
            download_and_analyze_image(
                bot,
                &doc.file,
                msg.chat.id,
                language_code,
                coach,
                analyzer,
                config,
            )
            .await?;
        } else {
            debug!(user_id = %msg.chat.id, "Received non-image document from user");
            bot.send_message(msg.chat.id, t_lang("error-analysis-validation", language_code))
                .await?;
        }
    }
    Ok(())
}

async fn handle_unsupported_message(bot: &Bot, msg: &Message) -> Result<()> {
    debug!(user_id = %msg.chat.id, "Received unsupported message type from user");
    bot.send_message(msg.chat.id, t_lang("unsupported-message", user_language(msg)))
        .await?;
    Ok(())
}

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    coach: SharedCoach,
    analyzer: Arc<dyn MealAnalyzer>,
    config: Arc<BotConfig>,
) -> Result<()> {
    if msg.text().is_some() {
        handle_text_message(&bot, &msg, coach).await?;
    } else if msg.photo().is_some() {
        handle_photo_message(&bot, &msg, coach, analyzer, &config).await?;
    } else if msg.document().is_some() {
        handle_document_message(&bot, &msg, coach, analyzer, &config).await?;
    } else {
        handle_unsupported_message(&bot, &msg).await?;
    }

    Ok(())
}
