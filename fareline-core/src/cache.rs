use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};

use crate::search::ResultSet;

/// Upper bound on distinct keys held in process. Only one key is used in practice.
const MAX_CACHE_ENTRIES: u64 = 16;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("cache payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Cache-aside store for the merged result set.
///
/// `get` and `put` are each atomic; a `get` followed by a `put` is not.
/// "Never stored" and "expired" both read back as `None`.
#[async_trait]
pub trait ResultCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<ResultSet>, CacheError>;

    /// Replace whatever is stored under `key`; the entry expires `ttl` from now.
    async fn put(&self, key: &str, set: ResultSet, ttl: Duration) -> Result<(), CacheError>;
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub set: ResultSet,
    pub inserted_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(set: ResultSet, ttl: Duration) -> Self {
        Self {
            set,
            inserted_at: Instant::now(),
            ttl,
        }
    }
}

/// Each entry lives for the TTL it was stored with. A replacing `put`
/// restarts the clock rather than inheriting the old deadline.
struct EntryTtl;

impl Expiry<String, CacheEntry> for EntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &CacheEntry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process backend on [`moka`], with per-entry expiry.
#[derive(Clone)]
pub struct MemoryResultCache {
    entries: Cache<String, CacheEntry>,
}

impl MemoryResultCache {
    pub fn new() -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(MAX_CACHE_ENTRIES)
                .expire_after(EntryTtl)
                .build(),
        }
    }
}

impl Default for MemoryResultCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultCache for MemoryResultCache {
    async fn get(&self, key: &str) -> Result<Option<ResultSet>, CacheError> {
        Ok(self.entries.get(key).await.map(|entry| {
            tracing::debug!(key, age_ms = entry.inserted_at.elapsed().as_millis() as u64, "memory cache entry found");
            entry.set
        }))
    }

    async fn put(&self, key: &str, set: ResultSet, ttl: Duration) -> Result<(), CacheError> {
        self.entries
            .insert(key.to_string(), CacheEntry::new(set, ttl))
            .await;
        Ok(())
    }
}
