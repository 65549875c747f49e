//! In-memory table model and record projection.
//!
//! A [`Table`] is a transient snapshot of one spreadsheet sheet: header names
//! plus rows of [`Cell`]s. Lookups never work on raw cells directly; they
//! project rows onto [`Record`]s through [`Columns`], which resolves each
//! semantic field to a header by alias.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{LookupError, Result};

/// Status label marking an order as still open.
pub const PENDING_STATUS: &str = "Pendente";

/// Text formats accepted for timestamps stored as text cells.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Date-only formats, interpreted at midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// A single spreadsheet value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Build a cell from an Excel serial date (days since 1899-12-30).
    pub fn from_excel_serial(serial: f64) -> Self {
        let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0))
        else {
            return Cell::Number(serial);
        };
        let millis = (serial * 86_400_000.0).round() as i64;
        epoch
            .checked_add_signed(Duration::milliseconds(millis))
            .map(Cell::DateTime)
            .unwrap_or(Cell::Number(serial))
    }

    /// Whether the cell holds no value (empty, or whitespace-only text).
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render the cell as display text.
    ///
    /// Integral numbers drop the fractional part, so an identifier stored as
    /// `123.0` renders as `"123"`.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Interpret the cell as a timestamp, if it holds one.
    pub fn to_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::DateTime(dt) => Some(*dt),
            Cell::Text(s) => parse_timestamp(s),
            _ => None,
        }
    }
}

/// Parse a timestamp written as text.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Normalize an identifier for comparison.
///
/// Leading zeros are stripped after trimming whitespace, so `"007"` and `"7"`
/// compare equal. A non-empty all-zero value normalizes to `"0"`.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = trimmed.trim_start_matches('0');
    if stripped.is_empty() && !trimmed.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

/// A snapshot of one sheet: header names and rows in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create a table. Rows with no non-empty cell are dropped.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let headers = headers.into_iter().map(|h| h.trim().to_string()).collect();
        let rows = rows
            .into_iter()
            .filter(|row| row.iter().any(|c| !c.is_empty()))
            .collect();
        Self { headers, rows }
    }

    /// Build a table from text cells. Convenient for tests and CSV input.
    pub fn from_strings<H, R, S>(headers: H, rows: R) -> Self
    where
        H: IntoIterator<Item = S>,
        R: IntoIterator<Item = Vec<S>>,
        S: Into<String>,
    {
        let headers = headers.into_iter().map(Into::into).collect();
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|s| {
                        let s: String = s.into();
                        if s.is_empty() {
                            Cell::Empty
                        } else {
                            Cell::Text(s)
                        }
                    })
                    .collect()
            })
            .collect();
        Self::new(headers, rows)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first header matching any alias (trimmed, case-insensitive).
    fn column_index(&self, aliases: &[String]) -> Option<usize> {
        self.headers.iter().position(|h| {
            aliases
                .iter()
                .any(|alias| h.eq_ignore_ascii_case(alias.trim()))
        })
    }

    /// Project every row onto a [`Record`].
    ///
    /// Fails with [`LookupError::SchemaMismatch`] naming every missing field
    /// before any row is read. `RegisteredAt` is only required when
    /// `require_timestamp` is set; otherwise it is filled in when present.
    pub fn records(&self, columns: &Columns, require_timestamp: bool) -> Result<Vec<Record>> {
        let line = self.column_index(&columns.line);
        let order_id = self.column_index(&columns.order_id);
        let status = self.column_index(&columns.status);
        let registered_at = self.column_index(&columns.registered_at);

        let mut missing = Vec::new();
        if line.is_none() {
            missing.push(columns.label(Field::Line));
        }
        if order_id.is_none() {
            missing.push(columns.label(Field::OrderId));
        }
        if status.is_none() {
            missing.push(columns.label(Field::Status));
        }
        if require_timestamp && registered_at.is_none() {
            missing.push(columns.label(Field::RegisteredAt));
        }

        let (Some(line), Some(order_id), Some(status)) = (line, order_id, status) else {
            return Err(LookupError::SchemaMismatch { missing });
        };
        if !missing.is_empty() {
            return Err(LookupError::SchemaMismatch { missing });
        }

        let cell = |row: &[Cell], idx: usize| row.get(idx).cloned().unwrap_or(Cell::Empty);

        Ok(self
            .rows
            .iter()
            .map(|row| Record {
                line: cell(row, line).to_text(),
                order_id: cell(row, order_id).to_text(),
                status: cell(row, status).to_text(),
                registered_at: registered_at.and_then(|idx| cell(row, idx).to_timestamp()),
            })
            .collect())
    }
}

/// Semantic fields a record is projected onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Line,
    OrderId,
    Status,
    RegisteredAt,
}

/// Header aliases for each semantic field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    pub line: Vec<String>,
    pub order_id: Vec<String>,
    pub status: Vec<String>,
    pub registered_at: Vec<String>,
}

impl Default for Columns {
    fn default() -> Self {
        let owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();
        Self {
            line: owned(&["Line", "Linha"]),
            order_id: owned(&["OrderId", "OP"]),
            status: owned(&["Status"]),
            registered_at: owned(&["RegisteredAt", "Data", "Data de Registro"]),
        }
    }
}

impl Columns {
    /// Add an extra header alias for a field, ahead of the defaults.
    pub fn with_alias(mut self, field: Field, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        let list = match field {
            Field::Line => &mut self.line,
            Field::OrderId => &mut self.order_id,
            Field::Status => &mut self.status,
            Field::RegisteredAt => &mut self.registered_at,
        };
        if !list.iter().any(|a| a.eq_ignore_ascii_case(&alias)) {
            list.insert(0, alias);
        }
        self
    }

    /// Name used for a field in error messages: its first alias.
    fn label(&self, field: Field) -> String {
        let list = match field {
            Field::Line => &self.line,
            Field::OrderId => &self.order_id,
            Field::Status => &self.status,
            Field::RegisteredAt => &self.registered_at,
        };
        list.first().cloned().unwrap_or_else(|| format!("{:?}", field))
    }
}

/// One row of the table, projected onto the fields the bot understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub line: String,
    pub order_id: String,
    pub status: String,
    pub registered_at: Option<NaiveDateTime>,
}

impl Record {
    pub fn is_pending(&self) -> bool {
        self.status.trim() == PENDING_STATUS
    }
}
