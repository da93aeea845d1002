//! Check-in bot binary.
//!
//! Usage: `checkin-bot [CONFIG_PATH]`. Without an argument the config is
//! read from the platform config directory; a missing file means defaults.
//! Secrets usually come from `DISCORD_TOKEN` and `ANTHROPIC_API_KEY`.
//!
//! The binary runs the reminder sweep. It also builds the [`CheckInService`]
//! with the configured decorator so enrichment settings are resolved at
//! startup; the inbound interaction layer that submits check-ins to it is
//! hosted outside this binary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use checkin::checkin::CheckInService;
use checkin::config::BotConfig;
use checkin::cycle::Evaluator;
use checkin::enrich;
use checkin::notify::{DiscordMessenger, Dispatcher, Messenger};
use checkin::scheduler::Scheduler;
use checkin::store::{JsonFileUserStore, UserStore};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Log to stderr and to a daily-rolling file under `logs_dir`.
///
/// The returned guard flushes the file writer when dropped.
fn init_logging(logs_dir: &Path) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all(logs_dir)?;
    let appender = tracing_appender::rolling::daily(logs_dir, "checkin-bot.log");
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();
    Ok(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(BotConfig::default_config_path);
    let mut config = BotConfig::load_or_default(&config_path)?;
    config.apply_env_overrides();
    config.validate()?;

    let data_dir = config.storage.resolved_data_dir();
    let _log_guard = init_logging(&config.storage.logs_dir())?;
    tracing::info!(
        config = %config_path.display(),
        data_dir = %data_dir.display(),
        "checkin-bot starting"
    );

    let evaluator = Evaluator::new(
        config.scheduler.schedule_defaults()?,
        config.scheduler.due_window_minutes,
    );
    tokio::fs::create_dir_all(&data_dir).await?;
    let store: Arc<dyn UserStore> = Arc::new(JsonFileUserStore::new(config.storage.users_path()));
    let messenger: Arc<dyn Messenger> = Arc::new(DiscordMessenger::from_config(&config.discord)?);

    let _checkins = CheckInService::new(
        Arc::clone(&store),
        Arc::clone(&messenger),
        enrich::from_config(&config.enrichment),
    );
    tracing::info!(enrichment = config.enrichment.is_active(), "check-in intake ready");

    let dispatcher = Dispatcher::new(store, messenger, evaluator);
    let cancel = CancellationToken::new();
    let scheduler = Scheduler::new(dispatcher, config.scheduler.clone()).run(cancel.child_token());

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    cancel.cancel();
    scheduler.await?;

    tracing::info!("checkin-bot shut down cleanly");
    Ok(())
}
