use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MedibotError, Result};

/// Default remote chat endpoint.
pub const DEFAULT_BACKEND_URL: &str = "https://botbackend-3-h103.onrender.com/chat";

/// Default storage key for the persisted transcript.
pub const DEFAULT_TRANSCRIPT_KEY: &str = "chatHistory";

/// Top-level configuration for the Medibot client.
///
/// Loaded from `~/.medibot/config.toml` by default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedibotConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl MedibotConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MedibotConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MedibotError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the transcript database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.medibot/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Remote chat backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Endpoint receiving `POST {message, age?}`.
    pub url: String,
    /// Optional client timeout. Requests are unbounded when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout_secs: None,
        }
    }
}

/// Local fallback matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Whether the local fallback is available at all.
    pub enabled: bool,
    /// Condition table (JSON or TOML). The bundled table is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_path: Option<String>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dataset_path: None,
        }
    }
}

/// Transcript persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file name, relative to `general.data_dir`.
    pub db_file: String,
    /// Key under which the transcript is stored.
    pub transcript_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_file: "medibot.db".to_string(),
            transcript_key: DEFAULT_TRANSCRIPT_KEY.to_string(),
        }
    }
}
