use crate::domain::ChatId;

/// Cross-messenger incoming update model.
///
/// Telegram-specific fields live in the Telegram adapter.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    Command(Command),
    Text(TextMessage),
    Photo(PhotoMessage),
    Callback(CallbackQuery),
}

impl IncomingUpdate {
    pub fn chat_id(&self) -> ChatId {
        match self {
            IncomingUpdate::Command(c) => c.chat_id,
            IncomingUpdate::Text(t) => t.chat_id,
            IncomingUpdate::Photo(p) => p.chat_id,
            IncomingUpdate::Callback(q) => q.chat_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            IncomingUpdate::Command(_) => "command",
            IncomingUpdate::Text(_) => "text",
            IncomingUpdate::Photo(_) => "photo",
            IncomingUpdate::Callback(_) => "callback",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Command {
    pub chat_id: ChatId,
    /// Lowercased command name without the slash or `@bot` suffix.
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct TextMessage {
    pub chat_id: ChatId,
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct PhotoMessage {
    pub chat_id: ChatId,
    /// File id of the largest available size.
    pub file_id: String,
}

#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub chat_id: ChatId,
    pub callback_id: String,
    pub data: String,
}

/// Inline keyboard (buttons) laid out in rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: callback_data.into(),
        }
    }
}

impl InlineKeyboard {
    pub fn new(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }

    /// Convenience for "one button per row" layouts.
    pub fn one_per_row(buttons: impl IntoIterator<Item = InlineButton>) -> Self {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }
}
