//! Day-scoped cache for backend configuration payloads.
//!
//! Entries are JSON envelopes carrying the payload plus the write
//! timestamp in unix milliseconds. A read older than [`CACHE_TTL_MS`]
//! evicts the entry and reports a miss; an entry exactly at the TTL is
//! still a hit. The storage itself is pluggable: [`MemoryStore`] for
//! tests and one-shot runs, [`FileStore`] for a state directory that
//! survives across invocations.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Cached configuration is trusted for 24 hours.
pub const CACHE_TTL_MS: i64 = 86_400_000;

/// Minimal string key/value storage. Failures degrade to misses, never
/// to errors; the cache is an optimization, not a source of truth.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: String);
    fn evict(&self, key: &str);
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// In-process store backed by a mutex-guarded map.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, value: String) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value);
        }
    }

    fn evict(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

/// One file per key under a directory, named `{key}.json`.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn put(&self, key: &str, value: String) {
        if let Err(err) = fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), error = %err, "cache directory unavailable");
            return;
        }
        if let Err(err) = fs::write(self.path_for(key), value) {
            warn!(key, error = %err, "cache write failed");
        }
    }

    fn evict(&self, key: &str) {
        let _ = fs::remove_file(self.path_for(key));
    }
}

// ---------------------------------------------------------------------------
// TTL cache
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    data: T,
    timestamp: i64,
}

/// Typed TTL cache over a [`KvStore`].
#[derive(Clone)]
pub struct ConfigCache {
    store: Arc<dyn KvStore>,
}

impl ConfigCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// The underlying store, for flat entries that skip the envelope.
    pub fn store(&self) -> &dyn KvStore {
        self.store.as_ref()
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) {
        self.put_at(key, value, Utc::now().timestamp_millis());
    }

    pub fn put_at<T: Serialize>(&self, key: &str, value: &T, timestamp: i64) {
        let envelope = Envelope {
            data: value,
            timestamp,
        };
        match serde_json::to_string(&envelope) {
            Ok(raw) => self.store.put(key, raw),
            Err(err) => warn!(key, error = %err, "cache entry not serializable"),
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_at(key, Utc::now().timestamp_millis())
    }

    /// Read with an explicit clock. Unreadable and expired entries are
    /// evicted so the next read does not repeat the work.
    pub fn get_at<T: DeserializeOwned>(&self, key: &str, now: i64) -> Option<T> {
        let raw = self.store.get(key)?;
        let envelope: Envelope<T> = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(key, error = %err, "evicting unreadable cache entry");
                self.store.evict(key);
                return None;
            }
        };
        if now - envelope.timestamp > CACHE_TTL_MS {
            debug!(key, age_ms = now - envelope.timestamp, "cache entry expired");
            self.store.evict(key);
            return None;
        }
        Some(envelope.data)
    }
}

// ---------------------------------------------------------------------------
// Connection flags
// ---------------------------------------------------------------------------

/// Plain boolean flags recording which platforms the operator marked
/// as connected. Stored flat, outside the TTL envelope: a connection
/// mark does not go stale.
pub mod flags {
    use super::KvStore;

    fn key(platform: &str) -> String {
        format!("connected_{}", platform.to_ascii_lowercase())
    }

    pub fn set_connected(store: &dyn KvStore, platform: &str, connected: bool) {
        store.put(&key(platform), connected.to_string());
    }

    pub fn is_connected(store: &dyn KvStore, platform: &str) -> bool {
        store.get(&key(platform)).as_deref() == Some("true")
    }
}
