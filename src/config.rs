//! Configuration types.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Broadcast chat the original coordinators' group uses.
pub const DEFAULT_BROADCAST_CHAT_ID: &str = "-1003088757586";

/// Spreadsheet name used when none is configured.
pub const DEFAULT_SHEET_NAME: &str = "Данные дневника Координаторов'25";

/// Which transport the bot listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Telegram,
    Cli,
}

impl std::str::FromStr for ChannelKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "telegram" | "" => Ok(Self::Telegram),
            "cli" => Ok(Self::Cli),
            other => Err(ConfigError::InvalidValue {
                key: "KOORDBOOK_CHANNEL".into(),
                message: format!("expected `telegram` or `cli`, got `{other}`"),
            }),
        }
    }
}

/// Where survey rows end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Local libSQL database file.
    LibSql { path: PathBuf },
    /// Google Sheets, authenticated with a service-account key file.
    GoogleSheets { credentials_path: PathBuf },
}

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Transport to listen on.
    pub channel: ChannelKind,
    /// Telegram bot token. Required for the Telegram channel.
    pub telegram_token: Option<SecretString>,
    /// Usernames or numeric ids allowed to talk to the bot (`*` = everyone).
    pub allowed_users: Vec<String>,
    /// Chat that receives relayed meeting photos.
    pub broadcast_chat_id: String,
    /// Name of the spreadsheet (or sheet table) rows are appended to.
    pub sheet_name: String,
    /// Persistence backend.
    pub store: StoreBackend,
}

impl BotConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let channel: ChannelKind = lookup("KOORDBOOK_CHANNEL")
            .unwrap_or_default()
            .parse()?;

        let telegram_token = lookup("TELEGRAM_BOT_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);
        if channel == ChannelKind::Telegram && telegram_token.is_none() {
            return Err(ConfigError::MissingEnvVar("TELEGRAM_BOT_TOKEN".into()));
        }

        let allowed_users: Vec<String> = lookup("TELEGRAM_ALLOWED_USERS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let broadcast_chat_id = lookup("KOORDBOOK_BROADCAST_CHAT_ID")
            .unwrap_or_else(|| DEFAULT_BROADCAST_CHAT_ID.to_string());
        if broadcast_chat_id.trim().parse::<i64>().is_err()
            && !broadcast_chat_id.trim().starts_with('@')
        {
            return Err(ConfigError::InvalidValue {
                key: "KOORDBOOK_BROADCAST_CHAT_ID".into(),
                message: format!("`{broadcast_chat_id}` is neither a chat id nor an @channel"),
            });
        }

        let sheet_name =
            lookup("KOORDBOOK_SHEET_NAME").unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string());

        let store = match lookup("KOORDBOOK_GOOGLE_CREDENTIALS").filter(|p| !p.trim().is_empty()) {
            Some(path) => StoreBackend::GoogleSheets {
                credentials_path: PathBuf::from(path),
            },
            None => StoreBackend::LibSql {
                path: lookup("KOORDBOOK_DB_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./data/koordbook.db")),
            },
        };

        Ok(Self {
            channel,
            telegram_token,
            allowed_users,
            broadcast_chat_id: broadcast_chat_id.trim().to_string(),
            sheet_name,
            store,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn telegram_requires_token() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn defaults_with_token() {
        let cfg = load(&[("TELEGRAM_BOT_TOKEN", "123:ABC")]).unwrap();
        assert_eq!(cfg.channel, ChannelKind::Telegram);
        assert_eq!(cfg.telegram_token.unwrap().expose_secret(), "123:ABC");
        assert_eq!(cfg.allowed_users, vec!["*"]);
        assert_eq!(cfg.broadcast_chat_id, DEFAULT_BROADCAST_CHAT_ID);
        assert_eq!(cfg.sheet_name, DEFAULT_SHEET_NAME);
        assert_eq!(
            cfg.store,
            StoreBackend::LibSql {
                path: PathBuf::from("./data/koordbook.db")
            }
        );
    }

    #[test]
    fn cli_channel_needs_no_token() {
        let cfg = load(&[("KOORDBOOK_CHANNEL", "CLI")]).unwrap();
        assert_eq!(cfg.channel, ChannelKind::Cli);
        assert!(cfg.telegram_token.is_none());
    }

    #[test]
    fn unknown_channel_rejected() {
        let err = load(&[("KOORDBOOK_CHANNEL", "discord")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn google_credentials_select_sheets_backend() {
        let cfg = load(&[
            ("KOORDBOOK_CHANNEL", "cli"),
            ("KOORDBOOK_GOOGLE_CREDENTIALS", "/etc/koordbook/credentials.json"),
            ("KOORDBOOK_DB_PATH", "/tmp/ignored.db"),
        ])
        .unwrap();
        assert_eq!(
            cfg.store,
            StoreBackend::GoogleSheets {
                credentials_path: PathBuf::from("/etc/koordbook/credentials.json")
            }
        );
    }

    #[test]
    fn allowed_users_are_trimmed() {
        let cfg = load(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("TELEGRAM_ALLOWED_USERS", " alice, 42 ,,"),
        ])
        .unwrap();
        assert_eq!(cfg.allowed_users, vec!["alice", "42"]);
    }

    #[test]
    fn broadcast_chat_must_be_id_or_handle() {
        let ok = load(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("KOORDBOOK_BROADCAST_CHAT_ID", "@koord"),
        ]);
        assert!(ok.is_ok());
        let err = load(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("KOORDBOOK_BROADCAST_CHAT_ID", "group chat"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "KOORDBOOK_BROADCAST_CHAT_ID"
        ));
    }
}
