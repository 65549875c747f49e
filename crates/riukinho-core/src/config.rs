//! Process-wide configuration for the bot.
//!
//! Everything is read once at startup into a [`BotConfig`] and passed
//! explicitly from there on. Values come from environment variables, which
//! the binary seeds from `.env` files via dotenvy before calling
//! [`BotConfig::from_env`].
//!
//! # Environment Variables
//!
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//! - `WEBHOOK_URL`, `WEBHOOK_SECRET`: Public base URL and secret path (webhook mode)
//! - `PORT`: Webhook listen port (default: 10000)
//! - `RIUKINHO_TABLE_URL`: Remote spreadsheet URL
//! - `RIUKINHO_TABLE_PATH`: Local spreadsheet path
//! - `RIUKINHO_TABLE_MODE`: `copy` (default) or `live` for local paths
//! - `RIUKINHO_SHEET`: Sheet name (default: Registros)
//! - `RIUKINHO_COLUMN_LINE`, `RIUKINHO_COLUMN_ORDER`, `RIUKINHO_COLUMN_STATUS`,
//!   `RIUKINHO_COLUMN_REGISTERED`: Extra header alias per field
//! - `RIUKINHO_CONFIG_DIR`: Override the config directory (default: ~/.riukinho)

use std::path::PathBuf;

use url::Url;

use crate::error::ConfigError;
use crate::table::{Columns, Field};

/// Environment variable for a custom config directory.
pub const CONFIG_DIR_ENV: &str = "RIUKINHO_CONFIG_DIR";

/// Default config directory name under home.
const DEFAULT_CONFIG_DIR: &str = ".riukinho";

/// Default sheet holding the order records.
pub const DEFAULT_SHEET: &str = "Registros";

/// Default webhook listen port.
pub const DEFAULT_PORT: u16 = 10000;

/// Get the config directory.
///
/// Uses `RIUKINHO_CONFIG_DIR` if set, otherwise `~/.riukinho`, falling back
/// to `.riukinho` in the current directory when no home is available.
pub fn config_dir() -> PathBuf {
    std::env::var(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(DEFAULT_CONFIG_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR))
        })
}

/// Get the path to the `.env` file in the config directory.
pub fn env_file() -> PathBuf {
    config_dir().join(".env")
}

/// Where the table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    /// Download from a URL on every request.
    Remote(Url),
    /// Copy a local file to a temporary location, then read the copy.
    LocalCopy(PathBuf),
    /// Read a local document in place.
    Live(PathBuf),
}

/// Webhook settings, only needed in webhook mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    /// Full URL registered with Telegram, secret path included.
    pub url: Url,
    /// Local port the webhook server listens on.
    pub port: u16,
}

/// Configuration shared by every transport.
#[derive(Debug, Clone)]
pub struct BotConfig {
    token: Option<String>,
    webhook_url: Option<String>,
    webhook_secret: Option<String>,
    port: u16,
    pub source: SourceConfig,
    pub sheet: String,
    pub columns: Columns,
}

impl BotConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let source = match (get("RIUKINHO_TABLE_URL"), get("RIUKINHO_TABLE_PATH")) {
            (Some(_), Some(_)) => return Err(ConfigError::AmbiguousSource),
            (None, None) => return Err(ConfigError::MissingSource),
            (Some(url), None) => {
                let parsed = Url::parse(&url).map_err(|e| ConfigError::InvalidUrl {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;
                SourceConfig::Remote(parsed)
            }
            (None, Some(path)) => {
                let path = PathBuf::from(shellexpand::tilde(&path).to_string());
                match get("RIUKINHO_TABLE_MODE").as_deref().map(str::to_lowercase).as_deref() {
                    None | Some("copy") => SourceConfig::LocalCopy(path),
                    Some("live") => SourceConfig::Live(path),
                    Some(other) => return Err(ConfigError::InvalidMode(other.to_string())),
                }
            }
        };

        let port = match get("PORT") {
            Some(p) => p.parse().map_err(|_| ConfigError::InvalidPort(p))?,
            None => DEFAULT_PORT,
        };

        let mut columns = Columns::default();
        for (key, field) in [
            ("RIUKINHO_COLUMN_LINE", Field::Line),
            ("RIUKINHO_COLUMN_ORDER", Field::OrderId),
            ("RIUKINHO_COLUMN_STATUS", Field::Status),
            ("RIUKINHO_COLUMN_REGISTERED", Field::RegisteredAt),
        ] {
            if let Some(alias) = get(key) {
                columns = columns.with_alias(field, alias);
            }
        }

        Ok(Self {
            token: get("TELEGRAM_BOT_TOKEN"),
            webhook_url: get("WEBHOOK_URL"),
            webhook_secret: get("WEBHOOK_SECRET"),
            port,
            source,
            sheet: get("RIUKINHO_SHEET").unwrap_or_else(|| DEFAULT_SHEET.to_string()),
            columns,
        })
    }

    /// The bot token, required by every Telegram transport.
    pub fn token(&self) -> Result<&str, ConfigError> {
        self.token.as_deref().ok_or(ConfigError::NoToken)
    }

    /// Override the webhook port (e.g. from a command-line flag).
    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    /// Webhook settings: `{WEBHOOK_URL}/{WEBHOOK_SECRET}` on the configured port.
    pub fn webhook(&self) -> Result<WebhookConfig, ConfigError> {
        let base = self
            .webhook_url
            .as_deref()
            .ok_or(ConfigError::MissingWebhookSetting("WEBHOOK_URL"))?;
        let secret = self
            .webhook_secret
            .as_deref()
            .ok_or(ConfigError::MissingWebhookSetting("WEBHOOK_SECRET"))?;

        let full = format!("{}/{}", base.trim_end_matches('/'), secret.trim_matches('/'));
        let url = Url::parse(&full).map_err(|e| ConfigError::InvalidUrl {
            url: full.clone(),
            reason: e.to_string(),
        })?;

        Ok(WebhookConfig {
            url,
            port: self.port,
        })
    }
}
