//! Telegram bot interface for Riukinho.
//!
//! Answers order lookups from a spreadsheet over Telegram, either by long
//! polling or behind a webhook.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//! - `RIUKINHO_TABLE_URL` or `RIUKINHO_TABLE_PATH`: Where the spreadsheet lives
//!
//! Webhook mode:
//! - `WEBHOOK_URL`: Public base URL
//! - `WEBHOOK_SECRET`: Secret path segment appended to the URL
//! - `PORT`: Listen port (default: 10000)
//!
//! See [`riukinho_core::config`] for the remaining settings.
//!
//! # Commands
//!
//! - `/start` - Welcome message and help
//! - `/help` - Show available commands
//! - `/status <order>` - Status of an order
//! - `/list <line>` - Orders registered for a line
//! - `/pending <line>` - Latest open order of a line

pub mod bot;
pub mod error;
pub mod handlers;
pub mod query;

pub use bot::RiukinhoBot;
pub use error::{BotError, Result};
pub use handlers::Command;
pub use query::run_query;
