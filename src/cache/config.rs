//! Cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_RESPONSE_LIMIT: usize = 512;
const DEFAULT_RESPONSE_TTL_SECONDS: u64 = 60;
const DEFAULT_RESPONSE_BODY_LIMIT_BYTES: usize = 1024 * 1024;
const DEFAULT_AUTO_CONSUME_INTERVAL_MS: u64 = 5000;
const DEFAULT_CONSUME_BATCH_LIMIT: usize = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache successful public GET responses in memory.
    pub enable_response_cache: bool,
    /// Maximum cached responses before LRU eviction.
    pub response_limit: usize,
    /// Lifetime of a cached response.
    pub response_ttl_seconds: u64,
    /// Responses with larger bodies are served but not cached.
    pub response_body_limit_bytes: usize,
    /// Interval of the background drain for events left in the queue.
    pub auto_consume_interval_ms: u64,
    /// Maximum events merged into one plan.
    pub consume_batch_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enable_response_cache: true,
            response_limit: DEFAULT_RESPONSE_LIMIT,
            response_ttl_seconds: DEFAULT_RESPONSE_TTL_SECONDS,
            response_body_limit_bytes: DEFAULT_RESPONSE_BODY_LIMIT_BYTES,
            auto_consume_interval_ms: DEFAULT_AUTO_CONSUME_INTERVAL_MS,
            consume_batch_limit: DEFAULT_CONSUME_BATCH_LIMIT,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enable_response_cache: settings.enable_response_cache,
            response_limit: settings.response_limit,
            response_ttl_seconds: settings.response_ttl_seconds,
            response_body_limit_bytes: settings.response_body_limit_bytes,
            auto_consume_interval_ms: settings.auto_consume_interval_ms,
            consume_batch_limit: settings.consume_batch_limit,
        }
    }
}

impl CacheConfig {
    /// Returns the response limit as NonZeroUsize, clamping to 1 if zero.
    pub fn response_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.response_limit).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn response_ttl(&self) -> Duration {
        Duration::from_secs(self.response_ttl_seconds)
    }

    /// Drain interval; zero disables the background task.
    pub fn auto_consume_interval(&self) -> Option<Duration> {
        (self.auto_consume_interval_ms > 0)
            .then(|| Duration::from_millis(self.auto_consume_interval_ms))
    }

    pub fn consume_batch_limit(&self) -> usize {
        self.consume_batch_limit.max(1)
    }
}
