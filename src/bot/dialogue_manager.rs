//! Dialogue Manager module: sends wizard replies and runs a completed
//! wizard through generation, persistence and delivery

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, InputFile};
use tracing::{error, info, warn};

use crate::dialogue::{AnswerRecord, WizardDialogue, WizardState};
use crate::localization::t_lang;
use crate::render::render;
use crate::wizard::{Markup, Reply, WizardEngine};

use super::ui_builder::{
    completion_links, replay_menu, reply_markup, split_message, MESSAGE_CHUNK_LIMIT,
};
use super::BotContext;

/// Send one engine reply, as a photo with caption when it carries an image
pub async fn send_reply(bot: &Bot, chat_id: ChatId, reply: &Reply) -> Result<()> {
    let markup = reply_markup(&reply.markup);

    if let Some(image_url) = reply.image_url {
        match reqwest::Url::parse(image_url) {
            Ok(url) => {
                let mut request = bot
                    .send_photo(chat_id, InputFile::url(url))
                    .caption(reply.text.clone());
                if let Some(markup) = markup.clone() {
                    request = request.reply_markup(markup);
                }
                match request.await {
                    Ok(_) => return Ok(()),
                    Err(e) => {
                        warn!(user_id = %chat_id, error = %e, "Failed to send photo, falling back to text");
                    }
                }
            }
            Err(e) => warn!(url = %image_url, error = %e, "Invalid image URL"),
        }
    }

    let mut request = bot.send_message(chat_id, reply.text.clone());
    if let Some(markup) = markup {
        request = request.reply_markup(markup);
    }
    request.await?;
    Ok(())
}

/// Send every reply in order
pub async fn send_replies(bot: &Bot, chat_id: ChatId, replies: &[Reply]) -> Result<()> {
    for reply in replies {
        send_reply(bot, chat_id, reply).await?;
    }
    Ok(())
}

/// Run the pipeline for a finished wizard and deliver the result
///
/// On success the chat moves to [`WizardState::Review`] so the result can be
/// shown again; on failure it returns to [`WizardState::Idle`]. A persistence
/// failure is logged and does not block delivery.
pub async fn complete_analysis(
    bot: &Bot,
    msg: &Message,
    dialogue: &WizardDialogue,
    ctx: &BotContext,
    answers: AnswerRecord,
    language_code: Option<&str>,
) -> Result<()> {
    let chat_id = msg.chat.id;
    let telegram_id = msg.from.as_ref().map(|user| user.id.0 as i64).unwrap_or(chat_id.0);

    if let Err(e) = bot.send_chat_action(chat_id, ChatAction::Typing).await {
        warn!(user_id = %chat_id, error = %e, "Failed to send typing indicator");
    }

    let result = match ctx.pipeline.run(ctx.flow, &answers).await {
        Ok(result) => result,
        Err(e) => {
            error!(user_id = %chat_id, error = %e, "Analysis failed");
            let outcome = WizardEngine::new(ctx.flow).fail(&e, language_code);
            send_replies(bot, chat_id, &outcome.replies).await?;
            dialogue.update(outcome.state).await?;
            return Ok(());
        }
    };

    if let Err(e) = ctx
        .store
        .record(telegram_id, language_code, ctx.flow, &answers, &result)
        .await
    {
        error!(user_id = %chat_id, error = %e, "Failed to persist analysis");
    }

    let text = render(ctx.flow, Some(&result));
    if let Err(e) = deliver_result(bot, chat_id, &text, language_code).await {
        error!(user_id = %chat_id, error = %e, "Failed to deliver analysis");
        let outcome = WizardEngine::new(ctx.flow).system_error(language_code);
        send_replies(bot, chat_id, &outcome.replies).await?;
        dialogue.update(outcome.state).await?;
        return Ok(());
    }

    dialogue.update(WizardState::Review { result }).await?;
    info!(user_id = %chat_id, flow = %ctx.flow.id, "Analysis delivered");
    Ok(())
}

/// Send the rendered result followed by the completion message
async fn deliver_result(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    language_code: Option<&str>,
) -> Result<()> {
    let chunks = split_message(text, MESSAGE_CHUNK_LIMIT);
    let last = chunks.len().saturating_sub(1);

    for (i, chunk) in chunks.into_iter().enumerate() {
        let markup = if i == last { replay_menu() } else { Markup::Keep };
        send_reply(bot, chat_id, &Reply::new(chunk, markup)).await?;
    }

    send_reply(
        bot,
        chat_id,
        &Reply::new(
            t_lang("analysis-complete", language_code),
            completion_links(language_code),
        ),
    )
    .await
}
