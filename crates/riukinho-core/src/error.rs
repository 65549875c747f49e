//! Error types for table access and configuration.

use thiserror::Error;

/// Errors that can occur while fetching or reading a table.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The table could not be obtained (network, file or sheet failure).
    #[error("Table source unavailable: {0}")]
    SourceUnavailable(String),

    /// The table is missing columns required by the lookup.
    #[error("Table is missing expected columns: {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },
}

/// Result type for lookup operations.
pub type Result<T> = std::result::Result<T, LookupError>;

impl From<std::io::Error> for LookupError {
    fn from(e: std::io::Error) -> Self {
        LookupError::SourceUnavailable(e.to_string())
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        LookupError::SourceUnavailable(format!("HTTP error: {}", e))
    }
}

impl From<calamine::Error> for LookupError {
    fn from(e: calamine::Error) -> Self {
        LookupError::SourceUnavailable(format!("Spreadsheet error: {}", e))
    }
}

impl From<csv::Error> for LookupError {
    fn from(e: csv::Error) -> Self {
        LookupError::SourceUnavailable(format!("CSV error: {}", e))
    }
}

/// Errors raised while building the bot configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither a table URL nor a table path was configured.
    #[error("No table source configured. Set RIUKINHO_TABLE_URL or RIUKINHO_TABLE_PATH.")]
    MissingSource,

    /// Both a table URL and a table path were configured.
    #[error("Set only one of RIUKINHO_TABLE_URL and RIUKINHO_TABLE_PATH, not both.")]
    AmbiguousSource,

    /// The table URL could not be parsed.
    #[error("Invalid table URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Unknown value for the local table mode.
    #[error("Invalid RIUKINHO_TABLE_MODE '{0}': expected 'copy' or 'live'")]
    InvalidMode(String),

    /// Bot token not provided.
    #[error("Telegram bot token not set. Set TELEGRAM_BOT_TOKEN environment variable.")]
    NoToken,

    /// Webhook mode requested without its settings.
    #[error("Webhook mode requires {0} to be set")]
    MissingWebhookSetting(&'static str),

    /// Webhook port is not a valid port number.
    #[error("Invalid PORT '{0}'")]
    InvalidPort(String),
}
