//! Error types for the Telegram bot.

use riukinho_core::{ConfigError, LookupError};
use thiserror::Error;

/// Errors that can occur in the Telegram bot.
#[derive(Debug, Error)]
pub enum BotError {
    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Failed to start the bot.
    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),

    /// Webhook registration or serving failed.
    #[error("Failed to register webhook: {0}")]
    WebhookFailed(String),

    /// A lookup run outside the chat transport failed.
    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupError),

    /// A request was missing its argument.
    #[error("{0}")]
    Usage(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for bot operations.
pub type Result<T> = std::result::Result<T, BotError>;
