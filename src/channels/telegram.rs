//! Telegram channel: long-polls the Bot API for updates.
//!
//! Understands text messages, photos and inline-keyboard callback queries.
//! Choice prompts are rendered as an inline keyboard with one button per row.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::channels::{
    Channel, InboundEvent, IncomingMessage, MessageStream, OutgoingResponse, PhotoRelay,
};
use crate::error::ChannelError;

/// Telegram rejects `callback_data` longer than this many bytes.
const CALLBACK_DATA_MAX_BYTES: usize = 64;

/// Telegram channel: connects to the Bot API via long-polling.
pub struct TelegramChannel {
    bot_token: SecretString,
    allowed_users: Vec<String>,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: SecretString, allowed_users: Vec<String>) -> Self {
        Self {
            bot_token,
            allowed_users,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        api_url(&self.bot_token, method)
    }

    /// Send a plain text message, with an inline keyboard when options are given.
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        options: &[String],
    ) -> Result<(), ChannelError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if !options.is_empty() {
            body["reply_markup"] = inline_keyboard(options);
        }

        let resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: "telegram".into(),
                reason: format!("sendMessage returned {status}: {}", api_description(&err)),
            });
        }

        Ok(())
    }

    /// Acknowledge a button press so the client stops its spinner.
    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), ChannelError> {
        answer_callback_query(
            &self.client,
            &self.api_url("answerCallbackQuery"),
            callback_query_id,
        )
        .await
    }
}

// ── Channel trait implementation ────────────────────────────────────

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let url = self.api_url("getUpdates");
        let answer_url = self.api_url("answerCallbackQuery");
        let allowed_users = self.allowed_users.clone();
        let client = self.client.clone();

        tokio::spawn(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram channel listening for messages...");

            loop {
                let body = serde_json::json!({
                    "offset": offset,
                    "timeout": 30,
                    "allowed_updates": ["message", "callback_query"]
                });

                let resp = match client.post(&url).json(&body).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                let data: Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Telegram parse error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                let Some(results) = data.get("result").and_then(Value::as_array) else {
                    if let Some(description) = data.get("description").and_then(Value::as_str) {
                        tracing::warn!("Telegram getUpdates error: {description}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                    }
                    continue;
                };

                for update in results {
                    // Advance offset past this update
                    if let Some(uid) = update.get("update_id").and_then(Value::as_i64) {
                        offset = uid + 1;
                    }

                    if let Some(query_id) = detached_callback_id(update) {
                        // The keyboard's message is gone; nothing to route the answer to.
                        tracing::warn!("Telegram: callback query {query_id} has no message");
                        let acked = answer_callback_query(&client, &answer_url, query_id).await;
                        if let Err(e) = acked {
                            tracing::warn!("Telegram: {e}");
                        }
                        continue;
                    }

                    let Some(incoming) = parse_update(update) else {
                        continue;
                    };

                    let is_allowed = {
                        let mut identities = vec![incoming.user_id.as_str()];
                        if let Some(ref username) = incoming.username {
                            identities.push(username.as_str());
                        }
                        check_user_allowed(&allowed_users, identities)
                    };

                    if !is_allowed {
                        tracing::warn!(
                            "Telegram: ignoring message from unauthorized user: \
                             username={}, user_id={}",
                            incoming.username.as_deref().unwrap_or("unknown"),
                            incoming.user_id
                        );
                        continue;
                    }

                    if tx.send(incoming).is_err() {
                        tracing::info!("Telegram listener channel closed");
                        return;
                    }
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        if let Some(query_id) = msg.metadata.get("callback_query_id").and_then(Value::as_str) {
            if let Err(e) = self.answer_callback_query(query_id).await {
                tracing::warn!("Telegram: {e}");
            }
        }

        if msg.chat_id.is_empty() {
            return Err(ChannelError::SendFailed {
                name: "telegram".into(),
                reason: "message has no chat_id".into(),
            });
        }

        self.send_message(&msg.chat_id, &response.content, &response.options)
            .await
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: format!("getMe returned {}", resp.status()),
            })
        }
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        tracing::info!("Telegram channel shutting down");
        Ok(())
    }
}

#[async_trait]
impl PhotoRelay for TelegramChannel {
    /// Re-send an already uploaded photo by its `file_id`.
    async fn relay_photo(
        &self,
        destination: &str,
        file_id: &str,
        caption: &str,
    ) -> Result<(), ChannelError> {
        let body = serde_json::json!({
            "chat_id": destination,
            "photo": file_id,
            "caption": caption,
        });

        let resp = self
            .client
            .post(self.api_url("sendPhoto"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::RelayFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let err = resp.text().await.unwrap_or_default();
            return Err(ChannelError::RelayFailed {
                name: "telegram".into(),
                reason: api_description(&err),
            });
        }

        tracing::info!("Telegram photo relayed to {destination}");
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn api_url(token: &SecretString, method: &str) -> String {
    format!("https://api.telegram.org/bot{}/{method}", token.expose_secret())
}

async fn answer_callback_query(
    client: &reqwest::Client,
    url: &str,
    callback_query_id: &str,
) -> Result<(), ChannelError> {
    let resp = client
        .post(url)
        .json(&serde_json::json!({ "callback_query_id": callback_query_id }))
        .send()
        .await
        .map_err(|e| ChannelError::SendFailed {
            name: "telegram".into(),
            reason: e.to_string(),
        })?;

    if !resp.status().is_success() {
        let err = resp.text().await.unwrap_or_default();
        return Err(ChannelError::SendFailed {
            name: "telegram".into(),
            reason: format!("answerCallbackQuery failed: {}", api_description(&err)),
        });
    }
    Ok(())
}

/// Check if any identity in the iterator matches the allowed users list.
fn check_user_allowed<'a>(
    allowed_users: &[String],
    identities: impl IntoIterator<Item = &'a str>,
) -> bool {
    let ids: Vec<&str> = identities.into_iter().collect();
    allowed_users
        .iter()
        .any(|u| u == "*" || ids.contains(&u.as_str()))
}

/// Pull the human-readable `description` out of a Bot API error body.
fn api_description(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("description").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| body.to_string())
}

/// Button payload: the option itself, or its index when too long.
fn callback_data(index: usize, option: &str) -> String {
    if option.len() <= CALLBACK_DATA_MAX_BYTES {
        option.to_string()
    } else {
        format!("#{index}")
    }
}

/// One button per row.
fn inline_keyboard(options: &[String]) -> Value {
    let rows: Vec<Value> = options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            serde_json::json!([{ "text": option, "callback_data": callback_data(i, option) }])
        })
        .collect();
    serde_json::json!({ "inline_keyboard": rows })
}

/// Map callback data back to the pressed button's label.
fn button_label(message: Option<&Value>, data: &str) -> String {
    message
        .and_then(|m| m.pointer("/reply_markup/inline_keyboard"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_array)
        .flatten()
        .find(|button| button.get("callback_data").and_then(Value::as_str) == Some(data))
        .and_then(|button| button.get("text").and_then(Value::as_str))
        .unwrap_or(data)
        .to_string()
}

fn sender_identity(from: &Value) -> Option<(String, Option<String>, Option<String>)> {
    let user_id = from.get("id").and_then(Value::as_i64)?.to_string();
    let username = from
        .get("username")
        .and_then(Value::as_str)
        .map(String::from);
    let first_name = from
        .get("first_name")
        .and_then(Value::as_str)
        .map(String::from);
    Some((user_id, username, first_name))
}

fn chat_id_of(message: &Value) -> Option<String> {
    message
        .get("chat")
        .and_then(|c| c.get("id"))
        .and_then(Value::as_i64)
        .map(|id| id.to_string())
}

/// Id of a callback query whose originating message is unavailable.
///
/// Such a query cannot be answered in chat but must still be acknowledged.
fn detached_callback_id(update: &Value) -> Option<&str> {
    let query = update.get("callback_query")?;
    if query.get("message").is_some() {
        return None;
    }
    query.get("id").and_then(Value::as_str)
}

/// Turn one `getUpdates` result into an incoming message.
///
/// Returns `None` for update kinds the bot does not handle.
pub fn parse_update(update: &Value) -> Option<IncomingMessage> {
    let (from, chat_id, event, metadata) = if let Some(message) = update.get("message") {
        let event = if let Some(text) = message.get("text").and_then(Value::as_str) {
            InboundEvent::Text(text.to_string())
        } else if let Some(sizes) = message.get("photo").and_then(Value::as_array) {
            // Sizes are ascending; keep the largest.
            let file_id = sizes
                .last()
                .and_then(|p| p.get("file_id"))
                .and_then(Value::as_str)?;
            InboundEvent::Photo {
                file_id: file_id.to_string(),
            }
        } else {
            return None;
        };
        (message.get("from")?, chat_id_of(message)?, event, Value::Null)
    } else if let Some(query) = update.get("callback_query") {
        let data = query.get("data").and_then(Value::as_str)?;
        let message = query.get("message");
        let event = InboundEvent::Choice(button_label(message, data));
        let metadata = serde_json::json!({
            "callback_query_id": query.get("id").and_then(Value::as_str).unwrap_or_default(),
        });
        (query.get("from")?, chat_id_of(message?)?, event, metadata)
    } else {
        return None;
    };

    let (user_id, username, first_name) = sender_identity(from)?;
    let mut incoming = IncomingMessage::new("telegram", user_id, event)
        .with_chat_id(chat_id)
        .with_metadata(metadata);
    if let Some(name) = first_name.or_else(|| username.clone()) {
        incoming = incoming.with_user_name(name);
    }
    if let Some(username) = username {
        incoming = incoming.with_username(username);
    }
    Some(incoming)
}

// ── Tests ───────────────────────────────────────────────────────────
