// On-disk sheet cache so short-lived invocations can reuse fetches

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::{SheetKey, SheetRow};

/// One cached export, stored as JSON next to its fetch timestamp.
///
/// Wall-clock millis rather than a monotonic instant: entries outlive the
/// process that wrote them.
#[derive(Debug, Serialize, Deserialize)]
struct DiskEntry {
    fetched_at_ms: u64,
    rows: Vec<SheetRow>,
}

/// Summary of one cache file, for `cache status`.
#[derive(Debug, Serialize)]
pub struct CacheEntryInfo {
    pub name: String,
    pub fetched_at_ms: u64,
    pub row_count: usize,
}

pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Platform cache directory, e.g. `~/.cache/sheetpick/sheets` on Linux.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|d| d.join("sheetpick").join("sheets"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load rows for `key` if a cached copy exists and is younger than `ttl`.
    /// Unreadable or malformed files count as misses.
    pub fn load(&self, key: &SheetKey, ttl: Duration) -> Option<Vec<SheetRow>> {
        let bytes = fs::read(self.path_for(key)).ok()?;
        let entry: DiskEntry = serde_json::from_slice(&bytes).ok()?;

        let age_ms = now_ms().saturating_sub(entry.fetched_at_ms);
        if u128::from(age_ms) >= ttl.as_millis() {
            return None;
        }
        Some(entry.rows)
    }

    /// Write rows for `key`. Best effort: a full disk or read-only cache
    /// directory should not break a fetch that already succeeded.
    pub fn store(&self, key: &SheetKey, rows: &[SheetRow]) {
        let entry = DiskEntry { fetched_at_ms: now_ms(), rows: rows.to_vec() };

        let result = fs::create_dir_all(&self.dir).and_then(|_| {
            let json = serde_json::to_vec(&entry)?;
            fs::write(self.path_for(key), json)
        });
        if let Err(e) = result {
            eprintln!("warning: could not write sheet cache: {}", e);
        }
    }

    /// List every readable cache file with its age and row count.
    pub fn entries(&self) -> Vec<CacheEntryInfo> {
        let Ok(dir) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        let mut infos = Vec::new();
        for entry in dir.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            let Ok(bytes) = fs::read(&path) else { continue };
            let Ok(parsed) = serde_json::from_slice::<DiskEntry>(&bytes) else {
                continue;
            };
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            infos.push(CacheEntryInfo {
                name,
                fetched_at_ms: parsed.fetched_at_ms,
                row_count: parsed.rows.len(),
            });
        }
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Delete all cache files, returning how many were removed.
    pub fn clear(&self) -> io::Result<usize> {
        let dir = match fs::read_dir(&self.dir) {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut removed = 0;
        for entry in dir.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn path_for(&self, key: &SheetKey) -> PathBuf {
        // Keys contain ':' and ranges may contain '!'; keep file names to a
        // portable character set.
        let name: String = key
            .to_string()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
