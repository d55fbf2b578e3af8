//! Bot loop: reads channel events one at a time and answers each with
//! exactly one message.

use std::sync::Arc;

use futures::StreamExt;

use crate::channels::{Channel, IncomingMessage, OutgoingResponse};
use crate::error::Error;
use crate::survey::{CommandParser, Reply, Respondent, SurveyEngine};

impl From<Reply> for OutgoingResponse {
    fn from(reply: Reply) -> Self {
        OutgoingResponse::text(reply.text).with_options(reply.options)
    }
}

/// Identity of the sender of `msg`.
pub fn respondent_of(msg: &IncomingMessage) -> Respondent {
    Respondent {
        user_id: msg.user_id.clone(),
        chat_id: msg.chat_id.clone(),
        username: msg.username.clone().unwrap_or_default(),
        display_name: msg.user_name.clone(),
    }
}

pub struct Bot {
    channel: Arc<dyn Channel>,
    engine: Arc<SurveyEngine>,
}

impl Bot {
    pub fn new(channel: Arc<dyn Channel>, engine: Arc<SurveyEngine>) -> Self {
        Self { channel, engine }
    }

    /// Route one message: commands first, everything else to the survey.
    pub async fn dispatch(&self, msg: &IncomingMessage) -> Reply {
        if let Some(command) = msg.event.as_text().and_then(CommandParser::parse) {
            tracing::debug!(user = %msg.user_id, ?command, "Command received");
            return self.engine.handle_command(&command, respondent_of(msg)).await;
        }
        self.engine.handle(&msg.user_id, &msg.event).await
    }

    /// Run until Ctrl+C or until the channel stream ends.
    pub async fn run(&self) -> Result<(), Error> {
        let mut message_stream = self.channel.start().await?;

        tracing::info!(channel = self.channel.name(), "KoordBook ready and listening");

        loop {
            let message = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, shutting down...");
                    break;
                }
                msg = message_stream.next() => {
                    match msg {
                        Some(m) => m,
                        None => {
                            tracing::info!("Channel stream ended, shutting down...");
                            break;
                        }
                    }
                }
            };

            let reply = self.dispatch(&message).await;
            if let Err(e) = self.channel.respond(&message, reply.into()).await {
                tracing::error!(user = %message.user_id, "Error sending reply: {e}");
            }
        }

        tracing::info!(
            active_sessions = self.engine.active_sessions().await,
            "Bot shutting down..."
        );
        self.channel.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::InboundEvent;

    #[test]
    fn reply_converts_to_response() {
        let reply = Reply {
            text: "Pick".into(),
            options: vec!["a".into(), "b".into()],
        };
        let resp: OutgoingResponse = reply.into();
        assert_eq!(resp.content, "Pick");
        assert_eq!(resp.options, vec!["a", "b"]);
    }

    #[test]
    fn respondent_uses_blank_username_when_missing() {
        let msg = IncomingMessage::new("telegram", "42", InboundEvent::Text("/start".into()))
            .with_chat_id("-100")
            .with_user_name("Anna");
        let r = respondent_of(&msg);
        assert_eq!(r.user_id, "42");
        assert_eq!(r.chat_id, "-100");
        assert_eq!(r.username, "");
        assert_eq!(r.display_name.as_deref(), Some("Anna"));
    }
}
