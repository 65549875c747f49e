//! Command dispatch: request in, reply text out.
//!
//! [`Responder`] is the single entry point every transport uses. It validates
//! the argument, fetches a fresh table, runs the lookup and formats the reply.
//! Failures never escape: they are logged and answered with
//! [`GENERIC_FAILURE`].

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::format::{self, GENERIC_FAILURE};
use crate::lookup;
use crate::source::TableSource;
use crate::table::{Columns, Record};

/// A parsed bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Start,
    Help,
    Status(String),
    List(String),
    Pending(String),
}

impl Request {
    /// Parse raw message text such as `/status 123` or `/list@SomeBot 5`.
    ///
    /// Returns `None` for text that is not a recognized command.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let body = text.strip_prefix('/').unwrap_or(text);
        let (head, rest) = match body.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (body, ""),
        };
        let name = head.split('@').next().unwrap_or(head).to_lowercase();
        Self::from_parts(&name, rest)
    }

    /// Build a request from a command name and its argument text.
    pub fn from_parts(name: &str, args: &str) -> Option<Self> {
        let args = args.to_string();
        match name {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            "status" => Some(Self::Status(args)),
            "list" => Some(Self::List(args)),
            "pending" => Some(Self::Pending(args)),
            _ => None,
        }
    }

    /// Command name without the leading slash.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::Status(_) => "status",
            Self::List(_) => "list",
            Self::Pending(_) => "pending",
        }
    }

    /// The first whitespace-separated token of the argument, if any.
    pub fn argument(&self) -> Option<&str> {
        match self {
            Self::Start | Self::Help => None,
            Self::Status(args) | Self::List(args) | Self::Pending(args) => {
                args.split_whitespace().next()
            }
        }
    }
}

/// Result of evaluating a request, before it is rendered as text.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Static text that needs no table.
    Help(String),
    /// The command was missing its argument.
    Usage(&'static str),
    Status { order_id: String, record: Option<Record> },
    Line { line: String, records: Vec<Record> },
    Pending { line: String, record: Option<Record> },
}

impl Outcome {
    /// Render the reply text.
    pub fn render(&self) -> String {
        match self {
            Outcome::Help(text) => text.clone(),
            Outcome::Usage(text) => text.to_string(),
            Outcome::Status { order_id, record } => {
                format::format_status(order_id, record.as_ref())
            }
            Outcome::Line { line, records } => format::format_line_listing(line, records),
            Outcome::Pending { line, record } => format::format_pending(line, record.as_ref()),
        }
    }

    /// Records matched by the lookup, if any.
    pub fn records(&self) -> Vec<&Record> {
        match self {
            Outcome::Status { record, .. } | Outcome::Pending { record, .. } => {
                record.iter().collect()
            }
            Outcome::Line { records, .. } => records.iter().collect(),
            Outcome::Help(_) | Outcome::Usage(_) => Vec::new(),
        }
    }
}

/// Answers requests against a table source.
#[derive(Clone)]
pub struct Responder {
    source: Arc<dyn TableSource>,
    columns: Columns,
}

impl Responder {
    pub fn new(source: Arc<dyn TableSource>, columns: Columns) -> Self {
        Self { source, columns }
    }

    /// Description of the underlying source, for logs.
    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// Evaluate a request, surfacing source and schema errors.
    ///
    /// The table is only fetched when the request carries an argument.
    pub async fn evaluate(&self, request: &Request) -> Result<Outcome> {
        let usage = match request {
            Request::Start | Request::Help => return Ok(Outcome::Help(format::start_message())),
            Request::Status(_) => format::status_usage(),
            Request::List(_) => format::list_usage(),
            Request::Pending(_) => format::pending_usage(),
        };

        let Some(arg) = request.argument() else {
            debug!(command = request.name(), "Missing argument");
            return Ok(Outcome::Usage(usage));
        };
        let arg = arg.to_string();

        let table = self.source.fetch().await?;

        let outcome = match request {
            Request::Status(_) => Outcome::Status {
                record: lookup::find_by_order_id(&table, &self.columns, &arg)?,
                order_id: arg,
            },
            Request::List(_) => Outcome::Line {
                records: lookup::find_all_by_line(&table, &self.columns, &arg)?,
                line: arg,
            },
            Request::Pending(_) => Outcome::Pending {
                record: lookup::find_latest_pending_by_line(&table, &self.columns, &arg)?,
                line: arg,
            },
            Request::Start | Request::Help => return Ok(Outcome::Help(format::start_message())),
        };

        Ok(outcome)
    }

    /// Produce the reply text for a request. Never fails.
    pub async fn respond(&self, request: &Request) -> String {
        let result = AssertUnwindSafe(self.evaluate(request)).catch_unwind().await;

        match result {
            Ok(Ok(outcome)) => {
                info!(
                    command = request.name(),
                    arg = ?request.argument(),
                    matches = outcome.records().len(),
                    "Request answered"
                );
                outcome.render()
            }
            Ok(Err(e)) => {
                error!(
                    command = request.name(),
                    arg = ?request.argument(),
                    table = %self.source.describe(),
                    error = %e,
                    "Lookup failed"
                );
                GENERIC_FAILURE.to_string()
            }
            Err(_) => {
                error!(
                    command = request.name(),
                    arg = ?request.argument(),
                    "Lookup panicked"
                );
                GENERIC_FAILURE.to_string()
            }
        }
    }
}
