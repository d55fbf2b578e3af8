//! The conversation engine: one survey session per user, driven one event
//! at a time.
//!
//! The engine owns the session table. State changes happen under the table
//! lock; store and relay calls happen after it is released.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Local;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::branch::{MeetingType, advance, first_step};
use super::commands::Command;
use super::prompts;
use super::record::{build_row, format_timestamp};
use super::session::{Respondent, Session};
use super::step::{InputKind, Step, Transition};
use crate::channels::{InboundEvent, PhotoRelay};
use crate::store::{SheetHandle, SheetStore};

/// The single message sent back for one processed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Buttons to offer (choice prompts only).
    pub options: Vec<String>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: Vec::new(),
        }
    }

    /// The prompt of `step`, with its options.
    pub fn prompt(step: Step) -> Self {
        Self::prompted(step, step.question().prompt.to_string())
    }

    fn prompted(step: Step, text: String) -> Self {
        Self {
            text,
            options: step
                .question()
                .options
                .iter()
                .map(|o| o.to_string())
                .collect(),
        }
    }
}

/// What to do once the session lock is released.
enum Action {
    Reply(Reply),
    Persist { row: Vec<String> },
    Relay { file_id: String, caption: String },
}

pub struct SurveyEngine {
    sessions: Mutex<HashMap<String, Session>>,
    store: Arc<dyn SheetStore>,
    sheet: SheetHandle,
    relay: Arc<dyn PhotoRelay>,
    broadcast_chat_id: String,
}

impl SurveyEngine {
    pub fn new(
        store: Arc<dyn SheetStore>,
        sheet: SheetHandle,
        relay: Arc<dyn PhotoRelay>,
        broadcast_chat_id: impl Into<String>,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            store,
            sheet,
            relay,
            broadcast_chat_id: broadcast_chat_id.into(),
        }
    }

    /// Begin a new session, replacing any previous one for this user.
    pub async fn start(&self, respondent: Respondent) -> Reply {
        let id = respondent.user_id.clone();
        let replaced = self
            .sessions
            .lock()
            .await
            .insert(id.clone(), Session::new(respondent))
            .is_some();
        info!(session = %id, replaced, "Survey session started");
        Reply::prompt(Step::Name)
    }

    /// Drop the user's session. Returns whether one existed.
    pub async fn end_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.lock().await.remove(session_id).is_some();
        if removed {
            info!(session = %session_id, "Survey session ended");
        }
        removed
    }

    /// Snapshot of a session, if one is active.
    pub async fn session(&self, session_id: &str) -> Option<Session> {
        self.sessions.lock().await.get(session_id).cloned()
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Run an administrative command.
    pub async fn handle_command(&self, command: &Command, respondent: Respondent) -> Reply {
        match command {
            Command::Start => self.start(respondent).await,
            Command::Help => Reply::text(prompts::HELP),
            Command::Cancel => {
                self.end_session(&respondent.user_id).await;
                Reply::text(prompts::CANCEL)
            }
            Command::Again => {
                self.end_session(&respondent.user_id).await;
                Reply::text(prompts::AGAIN)
            }
            Command::Id => Reply::text(prompts::chat_id(&respondent.chat_id)),
            Command::Unknown(name) => {
                debug!(command = %name, "Unknown command");
                Reply::text(prompts::UNKNOWN_COMMAND)
            }
        }
    }

    /// Feed one survey event (not a command) into the user's session.
    pub async fn handle(&self, session_id: &str, event: &InboundEvent) -> Reply {
        let action = {
            let mut sessions = self.sessions.lock().await;
            let Some(session) = sessions.get_mut(session_id) else {
                debug!(session = %session_id, kind = event.kind(), "Event without a session");
                return Reply::text(prompts::NO_SESSION);
            };
            apply(session, event, &self.sheet.header)
        };

        match action {
            Action::Reply(reply) => reply,
            Action::Persist { row } => self.persist(session_id, row).await,
            Action::Relay { file_id, caption } => self.relay(&file_id, &caption).await,
        }
    }

    async fn persist(&self, session_id: &str, row: Vec<String>) -> Reply {
        match self.store.append_row(&self.sheet, &row).await {
            Ok(()) => {
                if let Some(session) = self.sessions.lock().await.get_mut(session_id) {
                    session.step = Step::AwaitPhoto;
                }
                info!(
                    session = %session_id,
                    sheet = %self.sheet.name,
                    backend = self.store.backend_name(),
                    "Survey row appended"
                );
                Reply::prompt(Step::AwaitPhoto)
            }
            Err(e) => {
                error!(session = %session_id, error = %e, "Failed to persist survey row");
                self.sessions.lock().await.remove(session_id);
                Reply::text(prompts::SAVE_FAILED)
            }
        }
    }

    async fn relay(&self, file_id: &str, caption: &str) -> Reply {
        match self
            .relay
            .relay_photo(&self.broadcast_chat_id, file_id, caption)
            .await
        {
            Ok(()) => {
                info!(destination = %self.broadcast_chat_id, "Meeting photo relayed");
                Reply::text(prompts::PHOTO_RELAYED)
            }
            Err(e) => {
                error!(error = %e, "Failed to relay meeting photo");
                Reply::text(prompts::relay_error(&e.to_string()))
            }
        }
    }
}

/// Validate `event` against the current step and move the session on.
fn apply(session: &mut Session, event: &InboundEvent, header: &[String]) -> Action {
    let step = session.step;
    let question = step.question();

    let value = match (question.kind, event) {
        (InputKind::Text, InboundEvent::Text(text)) if !text.trim().is_empty() => {
            text.trim().to_string()
        }
        (InputKind::Choice, InboundEvent::Choice(option)) if question.accepts_option(option) => {
            option.clone()
        }
        (InputKind::Photo, InboundEvent::Photo { file_id }) => file_id.clone(),
        (expected, _) => {
            warn!(step = %step, got = event.kind(), "Input does not match the question");
            let hint = match expected {
                InputKind::Text => prompts::HINT_TEXT,
                InputKind::Choice => prompts::HINT_CHOICE,
                InputKind::Photo => prompts::HINT_PHOTO,
            };
            return Action::Reply(Reply::prompted(
                step,
                prompts::with_hint(hint, question.prompt),
            ));
        }
    };

    // The meeting type is recorded before any branch transition is reached.
    let meeting = session.meeting_type().unwrap_or(MeetingType::DEFAULT);
    let next = match question.transition {
        Transition::Next(next) => next,
        Transition::Branch => first_step(meeting.sub_path()),
        Transition::WithinBranch => advance(meeting.sub_path(), step),
        Transition::Persist => {
            session.record(step, value);
            let timestamp = format_timestamp(Local::now());
            return Action::Persist {
                row: build_row(header, session, &timestamp),
            };
        }
        Transition::Relay => {
            return Action::Relay {
                file_id: value,
                caption: caption(session),
            };
        }
    };

    session.record(step, value);
    debug!(from = %step, to = %next, "Survey step");
    session.step = next;
    Action::Reply(Reply::prompt(next))
}

fn caption(session: &Session) -> String {
    prompts::photo_caption(
        session.answer_or_blank("faculty"),
        session.answer_or_blank("group"),
        session.answer_or_blank("name"),
        session.answer_or_blank("surname"),
        &session.respondent.contact(),
        session.answer_or_blank("meeting_type"),
        session.answer_or_blank("date"),
    )
}
