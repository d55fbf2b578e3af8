//! Channel trait and message types shared by all transports.

use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use uuid::Uuid;

use crate::error::ChannelError;

/// What the user sent, as far as the survey cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Free-text message (commands included; the bot loop tells them apart).
    Text(String),
    /// A button press carrying the selected option value.
    Choice(String),
    /// An image attachment, referenced by the transport's file id.
    Photo { file_id: String },
}

impl InboundEvent {
    /// Text content, if this is a text message.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Choice(_) => "choice",
            Self::Photo { .. } => "photo",
        }
    }
}

/// A message received from a channel.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Unique message ID.
    pub id: Uuid,
    /// Channel this message came from.
    pub channel: String,
    /// Stable user identifier within the channel.
    pub user_id: String,
    /// Conversation identifier replies go to.
    pub chat_id: String,
    /// Transport handle (Telegram `@username`, without the `@`).
    pub username: Option<String>,
    /// Display name.
    pub user_name: Option<String>,
    /// The event payload.
    pub event: InboundEvent,
    /// When the message was received.
    pub received_at: DateTime<Utc>,
    /// Channel-specific extras (e.g. Telegram callback query id).
    pub metadata: serde_json::Value,
}

impl IncomingMessage {
    pub fn new(
        channel: impl Into<String>,
        user_id: impl Into<String>,
        event: InboundEvent,
    ) -> Self {
        let user_id = user_id.into();
        Self {
            id: Uuid::new_v4(),
            channel: channel.into(),
            chat_id: user_id.clone(),
            user_id,
            username: None,
            user_name: None,
            event,
            received_at: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_chat_id(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = chat_id.into();
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Response to send back to a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingResponse {
    /// Message text.
    pub content: String,
    /// Selectable options rendered as buttons (empty = plain message).
    pub options: Vec<String>,
}

impl OutgoingResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            options: Vec::new(),
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// Stream of incoming messages.
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// A chat transport the bot listens on.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel name for logs.
    fn name(&self) -> &str;

    /// Start listening; messages arrive on the returned stream.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Send a response to the conversation `msg` came from.
    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError>;

    /// Verify the channel can reach its backend.
    async fn health_check(&self) -> Result<(), ChannelError>;

    /// Graceful shutdown.
    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}

/// Forwards a received image to a broadcast destination.
#[async_trait]
pub trait PhotoRelay: Send + Sync {
    async fn relay_photo(
        &self,
        destination: &str,
        file_id: &str,
        caption: &str,
    ) -> Result<(), ChannelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_defaults_chat_to_user() {
        let msg = IncomingMessage::new("telegram", "42", InboundEvent::Text("hi".into()));
        assert_eq!(msg.user_id, "42");
        assert_eq!(msg.chat_id, "42");
        assert!(msg.username.is_none());
        assert!(msg.metadata.is_null());
    }

    #[test]
    fn builder_sets_identity() {
        let msg = IncomingMessage::new("telegram", "42", InboundEvent::Text("hi".into()))
            .with_chat_id("-100")
            .with_username("anna")
            .with_user_name("Anna");
        assert_eq!(msg.chat_id, "-100");
        assert_eq!(msg.username.as_deref(), Some("anna"));
        assert_eq!(msg.user_name.as_deref(), Some("Anna"));
    }

    #[test]
    fn event_kinds() {
        assert_eq!(InboundEvent::Text("a".into()).kind(), "text");
        assert_eq!(InboundEvent::Choice("a".into()).kind(), "choice");
        assert_eq!(
            InboundEvent::Photo {
                file_id: "f".into()
            }
            .kind(),
            "photo"
        );
        assert_eq!(InboundEvent::Choice("a".into()).as_text(), None);
    }

    #[test]
    fn response_with_options() {
        let resp = OutgoingResponse::text("Pick").with_options(["a", "b"]);
        assert_eq!(resp.content, "Pick");
        assert_eq!(resp.options, vec!["a", "b"]);
    }
}
