//! Sheet data source: fetch a published Google Sheet's CSV export, parse it
//! into rows, and cache results keyed by `(sheet_id, range)` with a TTL.
//!
//! The entry point is [`SheetStore`], which composes the HTTP client, the
//! in-memory TTL cache, and the optional disk cache, and guarantees one
//! network request per key per TTL window even under concurrent callers.

pub mod cache;
pub mod clock;
pub mod client;
pub mod disk;
pub mod parse;
pub mod store;

pub use cache::TtlCache;
pub use client::SheetClient;
pub use clock::{Clock, FakeClock, SystemClock};
pub use disk::{CacheEntryInfo, DiskCache};
pub use parse::{parse_rows, project_column, usable_items};
pub use store::SheetStore;

use std::fmt;
use std::time::Duration;

/// Cached entries older than this are treated as absent and refetched.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// One sheet row; width may vary between rows.
pub type SheetRow = Vec<String>;

/// Cache key for one fetchable dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetKey {
    pub sheet_id: String,
    pub range: Option<String>,
}

impl SheetKey {
    pub fn new(sheet_id: impl Into<String>) -> Self {
        Self { sheet_id: sheet_id.into(), range: None }
    }

    pub fn with_range(sheet_id: impl Into<String>, range: impl Into<String>) -> Self {
        Self { sheet_id: sheet_id.into(), range: Some(range.into()) }
    }
}

impl fmt::Display for SheetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.range {
            Some(range) => write!(f, "{}:{}", self.sheet_id, range),
            None => write!(f, "{}", self.sheet_id),
        }
    }
}

/// Errors from the data source. Each variant keeps its own stable
/// [`SheetError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    /// The sheet ID is empty or contains characters Google IDs never have.
    InvalidSheetId(String),
    /// Network or HTTP failure after retries. Never cached.
    Fetch(String),
    /// The fetch succeeded but projection yielded zero usable values.
    EmptyDataset,
}

impl SheetError {
    /// Short, stable message for end-user surfaces.
    pub fn user_message(&self) -> &'static str {
        match self {
            SheetError::InvalidSheetId(_) => "sheet is not configured",
            SheetError::Fetch(_) => "could not reach data source",
            SheetError::EmptyDataset => "sheet has no data",
        }
    }
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetError::InvalidSheetId(id) => write!(f, "invalid sheet id: {:?}", id),
            SheetError::Fetch(detail) => write!(f, "could not reach data source: {}", detail),
            SheetError::EmptyDataset => write!(f, "sheet has no data"),
        }
    }
}

impl std::error::Error for SheetError {}
