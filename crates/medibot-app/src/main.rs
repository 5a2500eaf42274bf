//! Medibot application binary - composition root.
//!
//! 1. Parse CLI args and load configuration from TOML
//! 2. Open the transcript store (SQLite)
//! 3. Load the condition table for the local fallback, if enabled
//! 4. Build the HTTP responder and the conversation controller
//! 5. Restore the previous transcript and run the terminal loop

mod cli;
mod repl;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::BufReader;

use medibot_chat::{ConversationController, HttpResponder};
use medibot_core::config::MedibotConfig;
use medibot_core::error::Result;
use medibot_matcher::{ConditionTable, LocalMatcher};
use medibot_storage::SqliteStore;

use cli::CliArgs;

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

/// Build the fallback matcher, or `None` when the fallback is disabled.
///
/// A configured table that fails to load is a startup error rather than a
/// silent switch to the bundled table.
fn build_matcher(config: &MedibotConfig) -> Result<Option<LocalMatcher>> {
    if !config.matcher.enabled {
        tracing::info!("Local fallback disabled");
        return Ok(None);
    }
    let table = match config.matcher.dataset_path.as_deref() {
        Some(path) => ConditionTable::load(Path::new(path))?,
        None => ConditionTable::builtin()?,
    };
    if table.is_empty() {
        tracing::warn!("Condition table is empty; local fallback will never match");
    }
    tracing::info!(records = table.len(), "Local fallback ready");
    Ok(Some(LocalMatcher::new(table)))
}

fn init_tracing(cli_level: Option<&str>, config_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = match cli_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = MedibotConfig::load_or_default(&config_file);
    args.apply_to(&mut config);

    // Tracing.
    init_tracing(args.resolve_log_level().as_deref(), &config.general.log_level);
    tracing::info!("Starting Medibot v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    // Storage.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }
    let db_path = data_dir.join(&config.storage.db_file);
    let store = Arc::new(SqliteStore::open(&db_path)?);
    tracing::info!(path = %db_path.display(), "Transcript store opened");

    // Remote responder + fallback.
    let timeout = config.backend.request_timeout_secs.map(Duration::from_secs);
    let responder = HttpResponder::new(config.backend.url.clone(), timeout)?;
    tracing::info!(url = %responder.url(), "Chat backend configured");
    let matcher = build_matcher(&config)?;

    let controller = ConversationController::new(
        Box::new(responder),
        matcher,
        store,
        config.storage.transcript_key.clone(),
    );
    tracing::info!(fallback = controller.has_matcher(), "Conversation controller ready");

    if args.clear {
        controller.clear()?;
        println!("Chat history cleared.");
        return Ok(());
    }

    let mut stdout = std::io::stdout();
    if controller.restore()? {
        repl::print_history(&controller, &mut stdout)?;
        println!();
    }

    let stdin = BufReader::new(tokio::io::stdin());
    repl::run(&controller, stdin, &mut stdout).await?;

    tracing::info!("Medibot stopped");
    Ok(())
}
