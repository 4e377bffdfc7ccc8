//! Telegram transport: events coming from chats and the sink for outgoing messages.

pub mod client;

use async_trait::async_trait;

use crate::error::DeliveryError;
use crate::session::SessionId;

pub use client::TelegramClient;

/// One inline keyboard button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Rows of inline buttons
pub type InlineKeyboard = Vec<Vec<InlineButton>>;

/// An event received from a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotEvent {
    /// Free text that is not a command
    Message {
        chat_id: SessionId,
        is_private: bool,
        text: String,
    },

    /// A slash command, e.g. `/track <address> <name>`
    Command {
        chat_id: SessionId,
        command: String,
        args: Vec<String>,
    },

    /// A press on an inline keyboard button
    Callback {
        chat_id: SessionId,
        message_id: i64,
        callback_query_id: String,
        data: String,
    },
}

impl BotEvent {
    pub fn chat_id(&self) -> SessionId {
        match self {
            BotEvent::Message { chat_id, .. }
            | BotEvent::Command { chat_id, .. }
            | BotEvent::Callback { chat_id, .. } => *chat_id,
        }
    }

    /// Split chat text into a command event or a plain message
    pub fn from_text(chat_id: SessionId, is_private: bool, text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Some(rest) = text.strip_prefix('/') {
            let mut words = rest.split_whitespace();
            let command = words.next()?;
            // Strip @botname suffix from commands like "/track@mybot"
            let command = command.split('@').next().unwrap_or(command).to_lowercase();
            Some(BotEvent::Command {
                chat_id,
                command,
                args: words.map(str::to_string).collect(),
            })
        } else {
            Some(BotEvent::Message {
                chat_id,
                is_private,
                text: text.to_string(),
            })
        }
    }
}

/// Outgoing side of a chat transport
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a new message, optionally with an inline keyboard
    async fn send_message(
        &self,
        chat_id: SessionId,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), DeliveryError>;

    /// Replace the text and keyboard of a message sent earlier
    async fn edit_message(
        &self,
        chat_id: SessionId,
        message_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), DeliveryError>;

    /// Dismiss the loading indicator of a button press
    async fn answer_callback(&self, callback_query_id: &str);
}
