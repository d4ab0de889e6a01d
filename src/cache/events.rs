//! Invalidation events and the in-memory queue that buffers them.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use metrics::gauge;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::lock::mutex_lock;

const SOURCE: &str = "cache::events";
const METRIC_EVENT_QUEUE_LEN: &str = "vetrina_cache_event_queue_len";

/// Monotonic sequence number assigned at publish time.
pub type Epoch = u64;

#[derive(Debug, Clone)]
pub struct CacheEvent {
    /// Idempotency key; the planner ignores repeated ids.
    pub id: Uuid,
    pub epoch: Epoch,
    pub kind: EventKind,
    pub timestamp: OffsetDateTime,
}

impl CacheEvent {
    pub fn new(kind: EventKind, epoch: Epoch) -> Self {
        Self {
            id: Uuid::new_v4(),
            epoch,
            kind,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

/// Storefront content that changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A product or its gallery was created, updated or deleted.
    ProductChanged { id: Uuid },
    /// A category was created, updated or deleted.
    CategoryChanged { slug: String },
    AnnouncementsChanged,
    CarouselChanged,
    /// A blog post changed; `slug` is the one readers may have cached.
    BlogPostChanged { slug: String },
    SettingsChanged,
    /// Every storefront surface is stale.
    FullRefresh,
}

/// FIFO buffer between publishers and the consumer.
pub struct EventQueue {
    queue: Mutex<VecDeque<CacheEvent>>,
    epoch_counter: AtomicU64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            epoch_counter: AtomicU64::new(0),
        }
    }

    pub fn next_epoch(&self) -> Epoch {
        self.epoch_counter.fetch_add(1, Ordering::SeqCst)
    }

    pub fn publish(&self, kind: EventKind) {
        let event = CacheEvent::new(kind, self.next_epoch());
        info!(
            target = "vetrina::cache::events",
            event_id = %event.id,
            event_epoch = event.epoch,
            event_kind = ?event.kind,
            "cache event enqueued"
        );

        let mut queue = mutex_lock(&self.queue, SOURCE, "publish");
        queue.push_back(event);
        gauge!(METRIC_EVENT_QUEUE_LEN).set(queue.len() as f64);
    }

    /// Removes up to `limit` events in publish order.
    pub fn drain(&self, limit: usize) -> Vec<CacheEvent> {
        let mut queue = mutex_lock(&self.queue, SOURCE, "drain");
        let count = limit.min(queue.len());
        let drained = queue.drain(..count).collect();
        gauge!(METRIC_EVENT_QUEUE_LEN).set(queue.len() as f64);
        drained
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.queue, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
