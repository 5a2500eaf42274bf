//! CLI argument definitions for the Medibot client.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use medibot_core::config::MedibotConfig;

/// Medibot - a symptom chat client with an offline fallback.
#[derive(Parser, Debug)]
#[command(name = "medibot", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Chat backend endpoint.
    #[arg(short = 'u', long = "backend-url")]
    pub backend_url: Option<String>,

    /// Condition table used by the local fallback (JSON or TOML).
    #[arg(long = "dataset")]
    pub dataset: Option<PathBuf>,

    /// Directory holding the transcript database.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Disable the local fallback matcher.
    #[arg(long = "no-fallback")]
    pub no_fallback: bool,

    /// Delete the stored chat history and exit.
    #[arg(long = "clear")]
    pub clear: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > MEDIBOT_CONFIG env var > ~/.medibot/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("MEDIBOT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the backend URL.
    ///
    /// Priority: --backend-url flag > MEDIBOT_BACKEND_URL env var > config value.
    pub fn resolve_backend_url(&self, config_url: &str) -> String {
        if let Some(ref url) = self.backend_url {
            return url.clone();
        }
        if let Ok(url) = std::env::var("MEDIBOT_BACKEND_URL") {
            if !url.trim().is_empty() {
                return url;
            }
        }
        config_url.to_string()
    }

    /// Resolve the log level. Returns `None` if not overridden.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }

    /// Fold every override into `config`.
    pub fn apply_to(&self, config: &mut MedibotConfig) {
        config.backend.url = self.resolve_backend_url(&config.backend.url);
        if let Some(ref dir) = self.data_dir {
            config.general.data_dir = dir.to_string_lossy().to_string();
        }
        if let Some(ref dataset) = self.dataset {
            config.matcher.dataset_path = Some(dataset.to_string_lossy().to_string());
        }
        if let Some(level) = self.resolve_log_level() {
            config.general.log_level = level;
        }
        if self.no_fallback {
            config.matcher.enabled = false;
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".medibot").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".medibot").join("config.toml");
    }
    PathBuf::from("config.toml")
}
