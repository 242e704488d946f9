//! Telegram update handlers.
//!
//! Each handler converts a teloxide update into the core's `IncomingUpdate`
//! and hands it to the `SupportDesk`, holding the per-chat lock so one chat's
//! events are processed in order.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use hepiq_core::{
    domain::ChatId,
    messaging::types::{self, IncomingUpdate},
    texts,
};

use crate::router::AppState;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let Some(update) = callback_update(&q) else {
        // No originating message (inline mode) or empty payload.
        if let Err(e) = bot.answer_callback_query(q.id).await {
            tracing::debug!("callback query not answered: {e}");
        }
        return Ok(());
    };
    dispatch(state, update).await;
    Ok(())
}

pub async fn handle_message(_bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    match message_update(&msg) {
        Some(update) => dispatch(state, update).await,
        None => tracing::debug!(chat_id = msg.chat.id.0, "unsupported message type ignored"),
    }
    Ok(())
}

async fn dispatch(state: Arc<AppState>, update: IncomingUpdate) {
    let chat = update.chat_id();
    let kind = update.kind();
    let _guard = state.chat_locks.lock_chat(chat.0).await;

    if let Err(e) = state.desk.handle(update).await {
        tracing::error!(chat_id = chat.0, kind, "update handling failed: {e}");
        if let Err(e) = state.messenger.send_text(chat, texts::INTERNAL_ERROR).await {
            tracing::warn!(chat_id = chat.0, "error notice not delivered: {e}");
        }
    }
}

fn callback_update(q: &CallbackQuery) -> Option<IncomingUpdate> {
    let chat_id = q.message.as_ref()?.chat.id;
    let data = q.data.clone().filter(|d| !d.is_empty())?;
    Some(IncomingUpdate::Callback(types::CallbackQuery {
        chat_id: ChatId(chat_id.0),
        callback_id: q.id.clone(),
        data,
    }))
}

fn message_update(msg: &Message) -> Option<IncomingUpdate> {
    let chat_id = ChatId(msg.chat.id.0);

    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            return Some(IncomingUpdate::Command(types::Command {
                chat_id,
                name: command_name(text),
            }));
        }
        return Some(IncomingUpdate::Text(types::TextMessage {
            chat_id,
            text: text.to_string(),
        }));
    }

    // Telegram lists sizes smallest first.
    if let Some(best) = msg.photo().and_then(|sizes| sizes.last()) {
        return Some(IncomingUpdate::Photo(types::PhotoMessage {
            chat_id,
            file_id: best.file.id.clone(),
        }));
    }

    None
}

fn command_name(text: &str) -> String {
    // Telegram may send `/cmd@botname arg1 ...`; arguments are ignored.
    text.split_whitespace()
        .next()
        .unwrap_or("")
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_bot_suffix() {
        assert_eq!(command_name("/MyId@hepiq_support_bot"), "myid");
        assert_eq!(command_name("  /start  hello there"), "start");
        assert_eq!(command_name("/cancel"), "cancel");
    }
}
