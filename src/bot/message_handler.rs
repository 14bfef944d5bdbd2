//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, warn};

use crate::dialogue::{WizardDialogue, WizardState};
use crate::localization::t_lang;
use crate::wizard::{Action, WizardEngine};

use super::dialogue_manager::{complete_analysis, send_replies};
use super::BotContext;

/// Entry point for every message update
pub async fn message_handler(
    bot: Bot,
    msg: Message,
    dialogue: WizardDialogue,
    ctx: Arc<BotContext>,
) -> Result<()> {
    let language_code = msg
        .from
        .as_ref()
        .and_then(|user| user.language_code.as_deref());

    let state = dialogue.get().await?.unwrap_or_default();
    let text = msg.text();

    match text {
        Some(text) => {
            debug!(user_id = %msg.chat.id, message_length = text.chars().count(), "Received text message from user");
        }
        None if !matches!(state, WizardState::Answering { .. }) => {
            return handle_unsupported_message(&bot, &msg, language_code).await;
        }
        None => {}
    }

    let engine = WizardEngine::new(ctx.flow);
    let outcome = engine.handle(state, text, language_code);

    send_replies(&bot, msg.chat.id, &outcome.replies).await?;
    dialogue.update(outcome.state).await?;

    if let Some(Action::Generate(answers)) = outcome.action {
        complete_analysis(&bot, &msg, &dialogue, &ctx, answers, language_code).await?;
    }

    Ok(())
}

async fn handle_unsupported_message(
    bot: &Bot,
    msg: &Message,
    language_code: Option<&str>,
) -> Result<()> {
    warn!(user_id = %msg.chat.id, "Received unsupported message type");
    bot.send_message(msg.chat.id, t_lang("unsupported-message", language_code))
        .await?;
    Ok(())
}
