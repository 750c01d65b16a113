//! Dialogue Manager module for delivering coach output to a chat

use anyhow::Result;
use teloxide::prelude::*;
use tracing::debug;

// Import core types
use crate::session::Outgoing;

// Import UI builder functions
use super::ui_builder::{format_onboarding_reply, format_portion_report, RenderedMessage};

/// Render one core message for the user's language
pub fn render_outgoing(outgoing: &Outgoing, language_code: Option<&str>) -> RenderedMessage {
    match outgoing {
        Outgoing::Onboarding(reply) => format_onboarding_reply(reply, language_code),
        Outgoing::Portion(report) => RenderedMessage {
            text: format_portion_report(report, language_code),
            markup: None,
        },
    }
}

/// Send every message produced by the coach, in order
pub async fn send_outgoing(
    bot: &Bot,
    chat_id: ChatId,
    outgoing: &[Outgoing],
    language_code: Option<&str>,
) -> Result<()> {
    if outgoing.is_empty() {
        debug!(user_id = %chat_id, "Coach produced no reply");
        return Ok(());
    }

    for message in outgoing {
        let rendered = render_outgoing(message, language_code);
        match rendered.markup {
            Some(markup) => {
                bot.send_message(chat_id, rendered.text)
                    .reply_markup(markup)
                    .await?;
            }
            None => {
                bot.send_message(chat_id, rendered.text).await?;
            }
        }
    }

    Ok(())
}
