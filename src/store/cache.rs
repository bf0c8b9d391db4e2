//! Short-lived cache of whole tabs.
//!
//! Entries expire `ttl` after they were stored, measured on the injected
//! [`Clock`]. Writers clear the entry for the tab they touched.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::Row;
use crate::clock::Clock;

pub const DEFAULT_TTL_SECS: i64 = 30;
pub const DEFAULT_MAX_ENTRIES: usize = 50;

struct CacheEntry {
    stored_at: DateTime<Utc>,
    rows: Arc<Vec<Row>>,
}

pub struct TtlCache {
    ttl: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self::with_capacity(ttl, DEFAULT_MAX_ENTRIES, clock)
    }

    pub fn with_capacity(ttl: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    // A poisoned lock only means a reader panicked mid-lookup; the map itself
    // is still consistent.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, key: &str) -> Option<Arc<Vec<Row>>> {
        let now = self.clock.now();
        let mut entries = self.entries();
        match entries.get(key) {
            Some(entry) if now - entry.stored_at < self.ttl => Some(Arc::clone(&entry.rows)),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, key: &str, rows: Arc<Vec<Row>>) {
        let now = self.clock.now();
        let mut entries = self.entries();

        if !entries.contains_key(key) && entries.len() >= self.max_entries {
            let ttl = self.ttl;
            entries.retain(|_, e| now - e.stored_at < ttl);
            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.stored_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(key.to_string(), CacheEntry { stored_at: now, rows });
    }

    pub fn clear(&self, key: &str) {
        self.entries().remove(key);
    }

    pub fn clear_all(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
