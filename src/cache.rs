//! Rendered-page cache for the index feed.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    created_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

pub const DEFAULT_MAX_ENTRIES: usize = 256;

/// Rendered bodies keyed by page. Entries stay valid until `ttl` elapses or
/// the cache is cleared, whatever happens to the underlying rows meanwhile.
/// At most `max_entries` bodies are held; a full cache drops expired entries
/// first, then the oldest one.
#[derive(Debug)]
pub struct IndexCache {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl IndexCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(ttl: Duration, max_entries: usize) -> Self {
        tracing::debug!(ttl_secs = ttl.as_secs(), max_entries, "creating index cache");
        Self {
            ttl,
            max_entries: max_entries.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if !entry.is_expired(self.ttl) => {
                tracing::debug!(key, "index cache hit");
                Some(entry.body.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: impl Into<String>, body: String) {
        if self.ttl.is_zero() {
            return;
        }
        let key = key.into();
        let mut entries = self.lock();
        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let ttl = self.ttl;
            entries.retain(|_, entry| !entry.is_expired(ttl));
            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.created_at)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    tracing::debug!(key = %oldest, "index cache full, evicting");
                    entries.remove(&oldest);
                }
            }
        }
        entries.insert(
            key,
            CacheEntry {
                body,
                created_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.lock().clear();
        tracing::debug!("index cache cleared");
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
