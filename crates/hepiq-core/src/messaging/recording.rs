//! In-memory messenger that records everything sent through it.
//!
//! Used by the test suites and handy for driving `SupportDesk` without a
//! Telegram connection.

use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicI32, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{port::MessagingPort, types::InlineKeyboard},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sent {
    Text {
        chat_id: ChatId,
        text: String,
        keyboard: Option<InlineKeyboard>,
    },
    Photo {
        chat_id: ChatId,
        file_id: String,
    },
    CallbackAnswer {
        callback_id: String,
        text: Option<String>,
    },
}

impl Sent {
    pub fn chat_id(&self) -> Option<ChatId> {
        match self {
            Sent::Text { chat_id, .. } | Sent::Photo { chat_id, .. } => Some(*chat_id),
            Sent::CallbackAnswer { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Sent::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn keyboard(&self) -> Option<&InlineKeyboard> {
        match self {
            Sent::Text { keyboard, .. } => keyboard.as_ref(),
            _ => None,
        }
    }
}

#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
    unreachable: Mutex<HashSet<ChatId>>,
    next_id: AtomicI32,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `chat_id` fail, as if the user blocked the bot.
    pub fn mark_unreachable(&self, chat_id: ChatId) {
        if let Ok(mut set) = self.unreachable.lock() {
            set.insert(chat_id);
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn sent_to(&self, chat_id: ChatId) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| s.chat_id() == Some(chat_id))
            .collect()
    }

    /// Last message (text or photo) delivered to `chat_id`.
    pub fn last_to(&self, chat_id: ChatId) -> Option<Sent> {
        self.sent_to(chat_id).pop()
    }

    pub fn clear(&self) {
        if let Ok(mut v) = self.sent.lock() {
            v.clear();
        }
    }

    fn record(&self, chat_id: ChatId, entry: Sent) -> Result<MessageRef> {
        let blocked = self
            .unreachable
            .lock()
            .map(|set| set.contains(&chat_id))
            .unwrap_or(false);
        if blocked {
            return Err(Error::External(format!("chat {chat_id} is unreachable")));
        }

        self.push(entry);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(id),
        })
    }

    fn push(&self, entry: Sent) {
        if let Ok(mut v) = self.sent.lock() {
            v.push(entry);
        }
    }
}

#[async_trait]
impl MessagingPort for RecordingMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        self.record(
            chat_id,
            Sent::Text {
                chat_id,
                text: text.to_string(),
                keyboard: None,
            },
        )
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        self.record(
            chat_id,
            Sent::Text {
                chat_id,
                text: text.to_string(),
                keyboard: Some(keyboard),
            },
        )
    }

    async fn send_photo(&self, chat_id: ChatId, file_id: &str) -> Result<MessageRef> {
        self.record(
            chat_id,
            Sent::Photo {
                chat_id,
                file_id: file_id.to_string(),
            },
        )
    }

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        self.push(Sent::CallbackAnswer {
            callback_id: callback_id.to_string(),
            text: text.map(str::to_string),
        });
        Ok(())
    }
}
