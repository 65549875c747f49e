//! Riukinho Core - spreadsheet lookups behind the logistics bot.
//!
//! This crate holds everything that does not depend on the chat transport:
//!
//! - **config**: Explicit process configuration read from the environment
//! - **source**: Table sources (remote download, local copy, live document)
//! - **table**: Table model, record projection and key normalization
//! - **lookup**: Order and line lookups over a table
//! - **format**: Reply text for every lookup outcome
//! - **dispatch**: Request parsing and the [`Responder`] used by transports

pub mod config;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod lookup;
pub mod source;
pub mod table;

pub use config::{BotConfig, SourceConfig, WebhookConfig};
pub use dispatch::{Outcome, Request, Responder};
pub use error::{ConfigError, LookupError, Result};
pub use lookup::{find_all_by_line, find_by_order_id, find_latest_pending_by_line};
pub use source::{LiveSource, LocalCopySource, RemoteSource, TableSource};
pub use table::{normalize, Cell, Columns, Field, Record, Table, PENDING_STATUS};
