//! Table sources: where the spreadsheet comes from.
//!
//! Every binding implements [`TableSource`], so lookup and formatting code is
//! written once regardless of where the document lives:
//!
//! - [`RemoteSource`] downloads the document over HTTP on every request
//! - [`LocalCopySource`] copies a local document before reading it, so a file
//!   held open by a desktop application is never read in place
//! - [`LiveSource`] reads a local document in place
//!
//! Downloads and copies land in a [`tempfile::NamedTempFile`] unique to the
//! request. The file is removed when the handle drops, whether parsing
//! succeeded or not.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use calamine::{open_workbook_auto, Data, Reader};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use url::Url;

use crate::config::{BotConfig, SourceConfig};
use crate::error::{LookupError, Result};
use crate::table::{parse_timestamp, Cell, Table};

/// Extension assumed when a URL path carries none.
const DEFAULT_EXTENSION: &str = "xlsx";

/// Prefix for temporary copies.
const TEMP_PREFIX: &str = "riukinho-";

/// Anything that can produce a fresh [`Table`] on demand.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Fetch a complete table, or fail with [`LookupError::SourceUnavailable`].
    async fn fetch(&self) -> Result<Table>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Build the source described by the configuration.
pub fn from_config(config: &BotConfig) -> Arc<dyn TableSource> {
    let sheet = config.sheet.clone();
    match &config.source {
        SourceConfig::Remote(url) => Arc::new(RemoteSource::new(url.clone(), sheet)),
        SourceConfig::LocalCopy(path) => Arc::new(LocalCopySource::new(path.clone(), sheet)),
        SourceConfig::Live(path) => Arc::new(LiveSource::new(path.clone(), sheet)),
    }
}

/// Downloads the document from a URL on every fetch.
pub struct RemoteSource {
    client: reqwest::Client,
    url: Url,
    sheet: String,
    temp_dir: Option<PathBuf>,
}

impl RemoteSource {
    pub fn new(url: Url, sheet: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            sheet: sheet.into(),
            temp_dir: None,
        }
    }

    /// Place temporary downloads in `dir` instead of the system temp directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Extension of the last URL path segment, lowercased.
    fn extension(&self) -> String {
        self.url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
    }
}

#[async_trait]
impl TableSource for RemoteSource {
    async fn fetch(&self) -> Result<Table> {
        debug!(url = %self.url, "Downloading table");

        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::SourceUnavailable(format!(
                "GET {} returned {}",
                self.url, status
            )));
        }
        let bytes = response.bytes().await?;

        let extension = self.extension();
        let sheet = self.sheet.clone();
        let temp_dir = self.temp_dir.clone();
        let table = run_blocking(move || {
            let mut temp = temp_file(temp_dir.as_deref(), &extension)?;
            temp.write_all(&bytes)?;
            temp.flush()?;
            read_document(temp.path(), &sheet)
        })
        .await?;

        info!(url = %self.url, rows = table.len(), "Table downloaded");
        Ok(table)
    }

    fn describe(&self) -> String {
        format!("remote {}", self.url)
    }
}

/// Copies a local document to a temporary file and reads the copy.
pub struct LocalCopySource {
    path: PathBuf,
    sheet: String,
    temp_dir: Option<PathBuf>,
}

impl LocalCopySource {
    pub fn new(path: impl Into<PathBuf>, sheet: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.into(),
            temp_dir: None,
        }
    }

    /// Place temporary copies in `dir` instead of the system temp directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }
}

#[async_trait]
impl TableSource for LocalCopySource {
    async fn fetch(&self) -> Result<Table> {
        let path = self.path.clone();
        let sheet = self.sheet.clone();
        let temp_dir = self.temp_dir.clone();

        let table = run_blocking(move || {
            let temp = temp_file(temp_dir.as_deref(), &extension_of(&path))?;
            std::fs::copy(&path, temp.path()).map_err(|e| {
                LookupError::SourceUnavailable(format!("Cannot copy {}: {}", path.display(), e))
            })?;
            read_document(temp.path(), &sheet)
        })
        .await?;

        debug!(path = %self.path.display(), rows = table.len(), "Table copied and read");
        Ok(table)
    }

    fn describe(&self) -> String {
        format!("copy of {}", self.path.display())
    }
}

/// Reads a local document in place on every fetch.
pub struct LiveSource {
    path: PathBuf,
    sheet: String,
}

impl LiveSource {
    pub fn new(path: impl Into<PathBuf>, sheet: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.into(),
        }
    }
}

#[async_trait]
impl TableSource for LiveSource {
    async fn fetch(&self) -> Result<Table> {
        let path = self.path.clone();
        let sheet = self.sheet.clone();

        let table = run_blocking(move || {
            if !path.is_file() {
                return Err(LookupError::SourceUnavailable(format!(
                    "Document not found: {}",
                    path.display()
                )));
            }
            read_document(&path, &sheet)
        })
        .await?;

        debug!(path = %self.path.display(), rows = table.len(), "Live table read");
        Ok(table)
    }

    fn describe(&self) -> String {
        format!("live {}", self.path.display())
    }
}

/// Run blocking document I/O off the async executor.
async fn run_blocking<F>(f: F) -> Result<Table>
where
    F: FnOnce() -> Result<Table> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| LookupError::SourceUnavailable(format!("Reader task failed: {}", e)))?
}

/// Create a uniquely named temporary file carrying the document's extension.
fn temp_file(dir: Option<&Path>, extension: &str) -> Result<NamedTempFile> {
    let suffix = format!(".{}", extension);
    let mut builder = tempfile::Builder::new();
    builder.prefix(TEMP_PREFIX).suffix(&suffix);
    let temp = match dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    Ok(temp)
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Read a document from disk, dispatching on its extension.
///
/// CSV files ignore `sheet`; spreadsheets must contain it. The first row is
/// the header row.
pub fn read_document(path: &Path, sheet: &str) -> Result<Table> {
    if extension_of(path) == "csv" {
        read_csv(path)
    } else {
        read_workbook(path, sheet)
    }
}

fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(text_cell).collect());
    }

    Ok(Table::new(headers, rows))
}

fn read_workbook(path: &Path, sheet: &str) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;

    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(LookupError::SourceUnavailable(format!(
            "Sheet '{}' not found in {}",
            sheet,
            path.display()
        )));
    }

    let range = workbook.worksheet_range(sheet)?;
    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(|c| data_cell(c).to_text()).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<Cell>> = rows.map(|row| row.iter().map(data_cell).collect()).collect();

    Ok(Table::new(headers, rows))
}

fn text_cell(raw: &str) -> Cell {
    if raw.trim().is_empty() {
        Cell::Empty
    } else {
        Cell::Text(raw.to_string())
    }
}

fn data_cell(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => text_cell(s),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::from_excel_serial(dt.as_f64()),
        Data::DateTimeIso(s) => parse_timestamp(s)
            .map(Cell::DateTime)
            .unwrap_or_else(|| text_cell(s)),
        Data::DurationIso(s) => text_cell(s),
        _ => Cell::Empty,
    }
}
