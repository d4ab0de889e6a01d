//! Response cache storage.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use bytes::Bytes;
use lru::LruCache;
use metrics::counter;

use super::config::CacheConfig;
use super::lock::mutex_lock;

const SOURCE: &str = "cache::store";
const METRIC_EVICT_TOTAL: &str = "vetrina_cache_l1_evict_total";

/// Request path plus raw query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseKey {
    pub path: String,
    pub query: String,
}

impl ResponseKey {
    pub fn new(path: impl Into<String>, query: Option<&str>) -> Self {
        Self {
            path: path.into(),
            query: query.unwrap_or_default().to_string(),
        }
    }

    /// Whether the key's path is `prefix` itself or lies beneath it.
    fn is_under(&self, prefix: &str) -> bool {
        let prefix = prefix.trim_end_matches('/');
        prefix.is_empty()
            || self.path == prefix
            || self
                .path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub stored_at: Instant,
}

/// LRU cache of public API responses with a fixed time-to-live.
///
/// Every invalidation advances a generation counter. A response rendered
/// while an invalidation ran may predate the write behind it, so fills carry
/// the generation observed before rendering and are dropped if it moved.
pub struct ResponseStore {
    responses: Mutex<LruCache<ResponseKey, CachedResponse>>,
    generation: AtomicU64,
    ttl: Duration,
}

impl ResponseStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            responses: Mutex::new(LruCache::new(config.response_limit_non_zero())),
            generation: AtomicU64::new(0),
            ttl: config.response_ttl(),
        }
    }

    /// Returns a live entry; expired entries are dropped on access.
    pub fn get(&self, key: &ResponseKey) -> Option<CachedResponse> {
        let mut responses = mutex_lock(&self.responses, SOURCE, "get");
        let expired = responses.peek(key)?.stored_at.elapsed() >= self.ttl;
        if expired {
            responses.pop(key);
            return None;
        }
        responses.get(key).cloned()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn set(&self, key: ResponseKey, response: CachedResponse) {
        let mut responses = mutex_lock(&self.responses, SOURCE, "set");
        Self::insert(&mut responses, key, response);
    }

    /// Stores `response` only if no invalidation happened since `generation`
    /// was read; returns whether it was stored.
    pub fn set_if_current(
        &self,
        key: ResponseKey,
        response: CachedResponse,
        generation: u64,
    ) -> bool {
        let mut responses = mutex_lock(&self.responses, SOURCE, "set_if_current");
        if self.generation.load(Ordering::Acquire) != generation {
            return false;
        }
        Self::insert(&mut responses, key, response);
        true
    }

    fn insert(
        responses: &mut LruCache<ResponseKey, CachedResponse>,
        key: ResponseKey,
        response: CachedResponse,
    ) {
        let evicted = responses.push(key.clone(), response);
        if evicted.is_some_and(|(evicted_key, _)| evicted_key != key) {
            counter!(METRIC_EVICT_TOTAL).increment(1);
        }
    }

    /// Drops every entry at or beneath `prefix` and returns how many went.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut responses = mutex_lock(&self.responses, SOURCE, "invalidate_prefix");
        self.generation.fetch_add(1, Ordering::AcqRel);
        let stale: Vec<ResponseKey> = responses
            .iter()
            .filter(|(key, _)| key.is_under(prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            responses.pop(key);
        }
        stale.len()
    }

    pub fn clear(&self) {
        let mut responses = mutex_lock(&self.responses, SOURCE, "clear");
        self.generation.fetch_add(1, Ordering::AcqRel);
        responses.clear();
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.responses, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
