//! Administrative slash commands.

/// A recognized command. Commands never consult the survey state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Cancel,
    /// `/again` or `/restart`.
    Again,
    /// Echo the chat id.
    Id,
    Unknown(String),
}

/// Parses message text into commands.
pub struct CommandParser;

impl CommandParser {
    /// Returns `None` when the text is not a command.
    ///
    /// Accepts an `@botname` suffix and ignores trailing arguments.
    pub fn parse(text: &str) -> Option<Command> {
        let trimmed = text.trim();
        let body = trimmed.strip_prefix('/')?;
        let word = body.split_whitespace().next().unwrap_or_default();
        let name = word.split('@').next().unwrap_or_default().to_lowercase();

        let command = match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "cancel" => Command::Cancel,
            "again" | "restart" => Command::Again,
            "id" => Command::Id,
            _ => Command::Unknown(word.to_string()),
        };
        Some(command)
    }
}
