// Caching layer over the sheet client

use std::collections::HashSet;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::cache::TtlCache;
use crate::clock::{Clock, SystemClock};
use crate::client::SheetClient;
use crate::disk::DiskCache;
use crate::{SheetError, SheetKey, SheetRow, DEFAULT_TTL};

/// Shared read path for sheet data: memory cache, then disk cache, then the
/// network, with concurrent requests for the same key collapsed into one
/// upstream fetch.
///
/// `max_rows` is applied at fetch time and is not part of the cache key; two
/// callers with different limits share whichever fetch ran first within the
/// TTL window.
pub struct SheetStore {
    client: SheetClient,
    cache: Mutex<TtlCache<SheetKey, Vec<SheetRow>>>,
    disk: Option<DiskCache>,
    in_flight: Mutex<HashSet<SheetKey>>,
    flight_done: Condvar,
    ttl: Duration,
}

impl SheetStore {
    pub fn new(client: SheetClient) -> Self {
        Self::with_ttl(client, DEFAULT_TTL, Arc::new(SystemClock))
    }

    pub fn with_ttl(client: SheetClient, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            cache: Mutex::new(TtlCache::new(ttl, clock)),
            disk: None,
            in_flight: Mutex::new(HashSet::new()),
            flight_done: Condvar::new(),
            ttl,
        }
    }

    /// Attach an on-disk cache consulted on memory misses.
    pub fn with_disk(mut self, disk: DiskCache) -> Self {
        self.disk = Some(disk);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Rows currently cached in memory for `key`, if fresh.
    pub fn cached(&self, key: &SheetKey) -> Option<Vec<SheetRow>> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.get(key).cloned()
    }

    /// Get rows for `key`, fetching if no fresh copy is cached.
    ///
    /// When several threads miss on the same key at once, one performs the
    /// fetch and the rest wait for it. Waiters that wake to a fresh cache
    /// entry return it; waiters that wake to a failed fetch retry as leaders
    /// themselves.
    pub fn rows(&self, key: &SheetKey, max_rows: u32) -> Result<Vec<SheetRow>, SheetError> {
        if let Some(rows) = self.cached(key) {
            return Ok(rows);
        }

        {
            let mut flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            while flight.contains(key) {
                flight = self
                    .flight_done
                    .wait(flight)
                    .unwrap_or_else(|e| e.into_inner());
                if let Some(rows) = self.cached(key) {
                    return Ok(rows);
                }
            }
            flight.insert(key.clone());
        }

        let result = self.refresh(key, max_rows);

        let mut flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        flight.remove(key);
        self.flight_done.notify_all();
        drop(flight);

        result
    }

    /// Drop any cached copy of `key` so the next read refetches.
    pub fn invalidate(&self, key: &SheetKey) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.remove(key);
    }

    fn refresh(&self, key: &SheetKey, max_rows: u32) -> Result<Vec<SheetRow>, SheetError> {
        if let Some(disk) = &self.disk {
            if let Some(rows) = disk.load(key, self.ttl) {
                self.remember(key, rows.clone());
                return Ok(rows);
            }
        }

        let rows = self.client.fetch_rows(key, max_rows)?;
        self.remember(key, rows.clone());
        if let Some(disk) = &self.disk {
            disk.store(key, &rows);
        }
        Ok(rows)
    }

    fn remember(&self, key: &SheetKey, rows: Vec<SheetRow>) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.insert(key.clone(), rows);
    }
}
