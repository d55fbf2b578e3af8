//! CLI channel: stdin/stdout REPL for local testing.
//!
//! Choice prompts print numbered options; typing the number selects one.
//! `!photo [file_id]` simulates sending a picture.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

use crate::channels::{
    Channel, InboundEvent, IncomingMessage, MessageStream, OutgoingResponse, PhotoRelay,
};
use crate::error::ChannelError;

const LOCAL_USER: &str = "local-user";

/// A simple CLI channel that reads from stdin and writes to stdout.
pub struct CliChannel {
    /// Options of the last prompt, for number selection.
    last_options: Arc<Mutex<Vec<String>>>,
}

impl CliChannel {
    pub fn new() -> Self {
        Self {
            last_options: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Interpret one input line given the options currently on screen.
fn parse_line(line: &str, options: &[String]) -> Option<InboundEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(rest) = line.strip_prefix("!photo") {
        let file_id = rest.trim();
        return Some(InboundEvent::Photo {
            file_id: if file_id.is_empty() {
                "cli-photo".to_string()
            } else {
                file_id.to_string()
            },
        });
    }

    if let Ok(n) = line.parse::<usize>() {
        if let Some(option) = n.checked_sub(1).and_then(|i| options.get(i)) {
            return Some(InboundEvent::Choice(option.clone()));
        }
    }

    Some(InboundEvent::Text(line.to_string()))
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let last_options = Arc::clone(&self.last_options);

        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            eprint!("> ");

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let event = {
                            let options = last_options.lock().await;
                            parse_line(&line, &options)
                        };
                        let Some(event) = event else {
                            eprint!("> ");
                            continue;
                        };
                        let msg = IncomingMessage::new("cli", LOCAL_USER, event)
                            .with_username(LOCAL_USER)
                            .with_user_name("Local");
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(
        &self,
        _msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        println!("\n{}", response.content);
        for (i, option) in response.options.iter().enumerate() {
            println!("  {}. {}", i + 1, option);
        }
        println!();
        *self.last_options.lock().await = response.options;
        eprint!("> ");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}

#[async_trait]
impl PhotoRelay for CliChannel {
    async fn relay_photo(
        &self,
        destination: &str,
        file_id: &str,
        caption: &str,
    ) -> Result<(), ChannelError> {
        eprintln!("📷 [{destination}] {file_id}\n{caption}");
        Ok(())
    }
}
