//! Telegram adapter (teloxide).
//!
//! This crate implements the `hepiq-core` MessagingPort over the Telegram Bot API.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile},
};

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use hepiq_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{port::MessagingPort, types::InlineKeyboard},
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    fn markup(keyboard: InlineKeyboard) -> InlineKeyboardMarkup {
        let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
            .rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|b| InlineKeyboardButton::callback(b.label, b.callback_data))
                    .collect()
            })
            .collect();
        InlineKeyboardMarkup::new(rows)
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        tracing::debug!("flood control, retrying in {d:?}");
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

fn message_ref(chat_id: ChatId, msg: &Message) -> MessageRef {
    MessageRef {
        chat_id,
        message_id: MessageId(msg.id.0),
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        let msg = self
            .with_retry(|| self.bot.send_message(Self::tg_chat(chat_id), text.to_string()))
            .await?;
        Ok(message_ref(chat_id, &msg))
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        let markup = Self::markup(keyboard);
        let msg = self
            .with_retry(|| {
                self.bot
                    .send_message(Self::tg_chat(chat_id), text.to_string())
                    .reply_markup(markup.clone())
            })
            .await?;
        Ok(message_ref(chat_id, &msg))
    }

    async fn send_photo(&self, chat_id: ChatId, file_id: &str) -> Result<MessageRef> {
        let msg = self
            .with_retry(|| {
                self.bot
                    .send_photo(Self::tg_chat(chat_id), InputFile::file_id(file_id.to_string()))
            })
            .await?;
        Ok(message_ref(chat_id, &msg))
    }

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        self.with_retry(|| {
            let mut req = self.bot.answer_callback_query(callback_id.to_string());
            if let Some(t) = text {
                req = req.text(t.to_string());
            }
            req
        })
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hepiq_core::{domain::TicketId, keyboards};

    #[test]
    fn admin_keyboard_keeps_row_layout() {
        let markup = TelegramMessenger::markup(keyboards::admin_ticket_actions(TicketId(7)));
        let widths: Vec<usize> = markup.inline_keyboard.iter().map(Vec::len).collect();
        assert_eq!(widths, vec![2, 1]);
    }
}
