//! Telegram Bot API client using raw reqwest.
//!
//! Long-polls `getUpdates` for incoming events and sends HTML formatted
//! messages through `sendMessage` / `editMessageText`.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{BotEvent, ChatTransport, InlineKeyboard};
use crate::error::DeliveryError;
use crate::session::SessionId;

/// Seconds Telegram holds a `getUpdates` request open
const LONG_POLL_SECS: u64 = 30;

/// Pause after a failed poll before retrying
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    token: String,
}

// --- Telegram API response types ---

#[derive(Debug, Deserialize)]
struct TgResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TgUpdate {
    update_id: i64,
    message: Option<TgMessage>,
    callback_query: Option<TgCallbackQuery>,
}

#[derive(Debug, Deserialize)]
struct TgCallbackQuery {
    id: String,
    message: Option<TgMessage>,
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TgMessage {
    message_id: i64,
    chat: TgChat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TgChat {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct TgUser {
    username: Option<String>,
}

impl TelegramClient {
    pub fn new(token: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(LONG_POLL_SECS * 2))
            .build()
            .context("failed to build telegram http client")?;

        Ok(Self { client, token })
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.token, method)
    }

    /// Username of the bot, used to detect mentions in group chats
    pub async fn get_me(&self) -> anyhow::Result<Option<String>> {
        let body: TgResponse<TgUser> = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await?
            .json()
            .await?;

        if !body.ok {
            anyhow::bail!("Telegram API error: {}", body.description.unwrap_or_default());
        }
        Ok(body.result.and_then(|user| user.username))
    }

    async fn get_updates(&self, offset: i64) -> anyhow::Result<Vec<TgUpdate>> {
        let body: TgResponse<Vec<TgUpdate>> = self
            .client
            .get(self.api_url("getUpdates"))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", LONG_POLL_SECS.to_string()),
            ])
            .send()
            .await?
            .json()
            .await?;

        if !body.ok {
            anyhow::bail!("Telegram API error: {}", body.description.unwrap_or_default());
        }
        Ok(body.result.unwrap_or_default())
    }

    fn parse_update(update: TgUpdate) -> Option<BotEvent> {
        if let Some(query) = update.callback_query {
            let message = query.message?;
            return Some(BotEvent::Callback {
                chat_id: message.chat.id,
                message_id: message.message_id,
                callback_query_id: query.id,
                data: query.data?,
            });
        }

        let message = update.message?;
        let text = message.text.as_deref()?;
        BotEvent::from_text(message.chat.id, message.chat.kind == "private", text)
    }

    /// Long-poll for updates and forward them to `tx` until cancelled.
    pub async fn run(&self, tx: Sender<BotEvent>, cancel: CancellationToken) {
        let mut offset: i64 = 0;

        loop {
            let updates = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.get_updates(offset) => match result {
                    Ok(updates) => updates,
                    Err(e) => {
                        warn!("Telegram poll error: {}", e);
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            _ = tokio::time::sleep(POLL_RETRY_DELAY) => continue,
                        }
                    }
                },
            };

            for update in updates {
                offset = update.update_id + 1;
                let Some(event) = Self::parse_update(update) else {
                    continue;
                };
                if tx.send(event).await.is_err() {
                    // Receiver dropped, nothing left to deliver to
                    return;
                }
            }
        }

        debug!("Telegram update loop stopped");
    }

    async fn post(&self, method: &str, payload: serde_json::Value) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(self.api_url(method))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body: TgResponse<serde_json::Value> = response.json().await?;
        if body.ok {
            return Ok(());
        }

        let description = body.description.unwrap_or_default();
        // Editing a message to identical content is not a failure for us
        if description.contains("message is not modified") {
            return Ok(());
        }
        Err(DeliveryError::Api(format!("{} ({})", description, status)))
    }

    fn keyboard_markup(keyboard: &InlineKeyboard) -> serde_json::Value {
        let rows: Vec<Vec<serde_json::Value>> = keyboard
            .iter()
            .map(|row| {
                row.iter()
                    .map(|button| {
                        serde_json::json!({
                            "text": button.text,
                            "callback_data": button.callback_data,
                        })
                    })
                    .collect()
            })
            .collect();
        serde_json::json!({ "inline_keyboard": rows })
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_message(
        &self,
        chat_id: SessionId,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), DeliveryError> {
        let mut payload = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });
        if let Some(keyboard) = keyboard {
            payload["reply_markup"] = Self::keyboard_markup(keyboard);
        }

        self.post("sendMessage", payload).await
    }

    async fn edit_message(
        &self,
        chat_id: SessionId,
        message_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), DeliveryError> {
        let mut payload = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });
        if let Some(keyboard) = keyboard {
            payload["reply_markup"] = Self::keyboard_markup(keyboard);
        }

        self.post("editMessageText", payload).await
    }

    async fn answer_callback(&self, callback_query_id: &str) {
        let payload = serde_json::json!({ "callback_query_id": callback_query_id });
        if let Err(e) = self.post("answerCallbackQuery", payload).await {
            warn!("answerCallbackQuery failed: {}", e);
        }
    }
}
