//! Publishing entry point used by the mutation services.

use std::sync::Arc;

use uuid::Uuid;

use super::consumer::{CacheConsumer, ConsumeReport};
use super::events::{EventKind, EventQueue};

/// Publishes invalidation events and consumes them right away.
///
/// Callers invoke it only after the store call that changed the content has
/// returned successfully.
pub struct CacheTrigger {
    queue: Arc<EventQueue>,
    consumer: Arc<CacheConsumer>,
}

impl CacheTrigger {
    pub fn new(queue: Arc<EventQueue>, consumer: Arc<CacheConsumer>) -> Self {
        Self { queue, consumer }
    }

    /// Publish `kind`; with `consume_now` the queue is drained immediately,
    /// otherwise the background interval picks it up.
    pub async fn trigger(&self, kind: EventKind, consume_now: bool) -> Option<ConsumeReport> {
        self.queue.publish(kind);
        if consume_now {
            self.consumer.consume().await
        } else {
            None
        }
    }

    pub async fn product_changed(&self, id: Uuid) {
        self.trigger(EventKind::ProductChanged { id }, true).await;
    }

    pub async fn category_changed(&self, slug: &str) {
        self.trigger(
            EventKind::CategoryChanged {
                slug: slug.to_string(),
            },
            true,
        )
        .await;
    }

    pub async fn announcements_changed(&self) {
        self.trigger(EventKind::AnnouncementsChanged, true).await;
    }

    pub async fn carousel_changed(&self) {
        self.trigger(EventKind::CarouselChanged, true).await;
    }

    pub async fn blog_post_changed(&self, slug: &str) {
        self.trigger(
            EventKind::BlogPostChanged {
                slug: slug.to_string(),
            },
            true,
        )
        .await;
    }

    pub async fn settings_changed(&self) {
        self.trigger(EventKind::SettingsChanged, true).await;
    }

    pub async fn full_refresh(&self) -> Option<ConsumeReport> {
        self.trigger(EventKind::FullRefresh, true).await
    }

    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    pub fn consumer(&self) -> &Arc<CacheConsumer> {
        &self.consumer
    }
}
