//! `spick fetch` — pull sheet rows and print or export them.
//!
//! The headless entry to the sheet pipeline: resolve settings, hit the
//! CSV export endpoint (or a cache layer), and emit the usable column
//! as plain lines, a JSON array, or a full-row CSV file.

use std::path::PathBuf;

use sheetpick_config::WidgetSettings;
use sheetpick_sheet::{usable_items, DiskCache, SheetClient, SheetError, SheetKey, SheetStore};
use sheetpick_widget::LoadRequest;

use crate::CliError;

// ── Shared store plumbing ───────────────────────────────────────────

/// Build the store every networked command shares.
///
/// `--base-url` points the client at a different server (tests use a
/// local mock). `--no-cache` drops the on-disk layer; the in-memory
/// TTL layer is per-process and never outlives a one-shot command.
pub(crate) fn build_store(base_url: Option<&str>, no_cache: bool) -> SheetStore {
    let client = match base_url {
        Some(url) => SheetClient::with_base_url(url),
        None => SheetClient::new(),
    };

    let store = SheetStore::new(client);
    if no_cache {
        return store;
    }
    match DiskCache::default_dir() {
        Some(dir) => store.with_disk(DiskCache::new(dir)),
        None => store,
    }
}

pub(crate) fn sheet_key(settings: &WidgetSettings, range: Option<String>) -> SheetKey {
    match range {
        Some(range) => SheetKey::with_range(settings.sheet_id.clone(), range),
        None => SheetKey::new(settings.sheet_id.clone()),
    }
}

/// Resolve a controller load request to its item list.
///
/// `serve` and `pick` both run this on a worker thread and feed the
/// result back through `handle_fetch_result`.
pub(crate) fn load_items(
    store: &SheetStore,
    request: &LoadRequest,
) -> Result<Vec<String>, SheetError> {
    let rows = store.rows(&request.key, request.max_rows)?;
    usable_items(&rows, request.column_index)
}

// ── Command ─────────────────────────────────────────────────────────

pub(crate) fn cmd_fetch(
    settings: &WidgetSettings,
    range: Option<String>,
    out: Option<PathBuf>,
    json: bool,
    no_cache: bool,
    base_url: Option<String>,
) -> Result<(), CliError> {
    let store = build_store(base_url.as_deref(), no_cache);
    let key = sheet_key(settings, range);
    let rows = store.rows(&key, settings.max_rows).map_err(CliError::sheet)?;

    if let Some(path) = out {
        write_rows_csv(&rows, &path)?;
        eprintln!("wrote {} rows to {}", rows.len(), path.display());
        return Ok(());
    }

    let items = usable_items(&rows, settings.column_index).map_err(CliError::sheet)?;

    if json {
        let rendered = serde_json::to_string_pretty(&items)
            .map_err(|e| CliError::general(format!("JSON encode error: {}", e)))?;
        println!("{}", rendered);
    } else {
        for item in &items {
            println!("{}", item);
        }
    }

    Ok(())
}

/// Write the full fetched grid (all columns, header row included) as CSV.
fn write_rows_csv(rows: &[Vec<String>], path: &PathBuf) -> Result<(), CliError> {
    let file = std::fs::File::create(path)
        .map_err(|e| CliError::general(format!("cannot create {}: {}", path.display(), e)))?;

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(std::io::BufWriter::new(file));

    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| CliError::general(format!("CSV write error: {}", e)))?;
    }
    writer
        .flush()
        .map_err(|e| CliError::general(format!("CSV flush error: {}", e)))?;

    Ok(())
}
