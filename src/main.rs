use std::sync::Arc;

use anyhow::Context;

use koordbook::bot::Bot;
use koordbook::channels::{Channel, CliChannel, PhotoRelay, TelegramChannel};
use koordbook::config::{BotConfig, ChannelKind, StoreBackend};
use koordbook::store::{GoogleSheetsStore, LibSqlSheetStore, SheetStore};
use koordbook::survey::{SurveyEngine, header_labels};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Fatal: {e}");
            std::process::exit(1);
        }
    };

    eprintln!("📒 KoordBook v{}", env!("CARGO_PKG_VERSION"));

    // ── Store ────────────────────────────────────────────────────────────
    let store: Arc<dyn SheetStore> = match &config.store {
        StoreBackend::LibSql { path } => Arc::new(
            LibSqlSheetStore::new_local(path)
                .await
                .with_context(|| format!("opening sheet store at {}", path.display()))?,
        ),
        StoreBackend::GoogleSheets { credentials_path } => Arc::new(
            GoogleSheetsStore::from_credentials_file(credentials_path)
                .await
                .context("loading Google service-account credentials")?,
        ),
    };

    let sheet = store
        .ensure_sheet(&config.sheet_name, &header_labels())
        .await
        .with_context(|| format!("opening sheet '{}'", config.sheet_name))?;
    tracing::info!(
        backend = store.backend_name(),
        sheet = %sheet.name,
        columns = sheet.width(),
        "Sheet ready"
    );

    // ── Channel ──────────────────────────────────────────────────────────
    let (channel, relay): (Arc<dyn Channel>, Arc<dyn PhotoRelay>) = match config.channel {
        ChannelKind::Telegram => {
            let token = config
                .telegram_token
                .clone()
                .context("TELEGRAM_BOT_TOKEN is required for the Telegram channel")?;
            let telegram = Arc::new(TelegramChannel::new(token, config.allowed_users.clone()));
            (
                telegram.clone() as Arc<dyn Channel>,
                telegram as Arc<dyn PhotoRelay>,
            )
        }
        ChannelKind::Cli => {
            eprintln!(
                "   Type answers and press Enter. Numbers pick options, !photo sends a photo.\n"
            );
            let cli = Arc::new(CliChannel::new());
            (cli.clone() as Arc<dyn Channel>, cli as Arc<dyn PhotoRelay>)
        }
    };

    if let Err(e) = channel.health_check().await {
        tracing::warn!("Channel health check failed: {e}");
    }

    let engine = Arc::new(SurveyEngine::new(
        store,
        sheet,
        relay,
        config.broadcast_chat_id.clone(),
    ));

    Bot::new(channel, engine).run().await?;
    Ok(())
}
