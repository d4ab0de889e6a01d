//! Executes invalidation plans.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use super::config::CacheConfig;
use super::events::EventQueue;
use super::planner::InvalidationPlan;
use super::remote::Revalidator;
use super::store::ResponseStore;

const METRIC_CACHE_CONSUME_MS: &str = "vetrina_cache_consume_ms";
const METRIC_REVALIDATION_TOTAL: &str = "vetrina_revalidation_total";

/// Outcome of one consumption pass.
#[derive(Debug)]
pub struct ConsumeReport {
    pub event_count: usize,
    pub plan: InvalidationPlan,
    pub evicted: usize,
    /// Background remote revalidation, when one was started.
    pub remote: Option<JoinHandle<()>>,
}

/// Drains the queue, evicts local responses and notifies the remote layer.
///
/// Local eviction completes before `consume` returns. The remote call runs on
/// its own task; its failure is logged and counted only.
pub struct CacheConsumer {
    config: CacheConfig,
    store: Arc<ResponseStore>,
    queue: Arc<EventQueue>,
    revalidator: Option<Arc<dyn Revalidator>>,
}

impl CacheConsumer {
    pub fn new(
        config: CacheConfig,
        store: Arc<ResponseStore>,
        queue: Arc<EventQueue>,
        revalidator: Option<Arc<dyn Revalidator>>,
    ) -> Self {
        Self {
            config,
            store,
            queue,
            revalidator,
        }
    }

    /// Returns `None` when the queue was empty.
    #[instrument(skip(self))]
    pub async fn consume(&self) -> Option<ConsumeReport> {
        let started_at = Instant::now();
        let events = self.queue.drain(self.config.consume_batch_limit());
        if events.is_empty() {
            return None;
        }

        let event_count = events.len();
        let plan = InvalidationPlan::from_events(events);
        info!(
            target = "vetrina::cache::consumer",
            event_count,
            plan = %plan,
            "cache consumption starting"
        );

        let evicted = plan
            .api_prefixes
            .iter()
            .map(|prefix| self.store.invalidate_prefix(prefix))
            .sum();

        let remote = self.spawn_remote(&plan);

        info!(
            target = "vetrina::cache::consumer",
            event_count,
            evicted,
            remote = remote.is_some(),
            "cache consumption complete"
        );
        histogram!(METRIC_CACHE_CONSUME_MS)
            .record(started_at.elapsed().as_secs_f64() * 1000.0);

        Some(ConsumeReport {
            event_count,
            plan,
            evicted,
            remote,
        })
    }

    fn spawn_remote(&self, plan: &InvalidationPlan) -> Option<JoinHandle<()>> {
        let revalidator = self.revalidator.clone()?;
        let paths = plan.page_paths();
        if paths.is_empty() {
            return None;
        }

        Some(tokio::spawn(async move {
            match revalidator.revalidate(&paths).await {
                Ok(()) => {
                    counter!(METRIC_REVALIDATION_TOTAL, "outcome" => "ok").increment(1);
                    info!(
                        target = "vetrina::cache::consumer",
                        path_count = paths.len(),
                        "remote revalidation accepted"
                    );
                }
                Err(err) => {
                    counter!(METRIC_REVALIDATION_TOTAL, "outcome" => "error").increment(1);
                    warn!(
                        target = "vetrina::cache::consumer",
                        error = %err,
                        paths = ?paths,
                        "remote revalidation failed"
                    );
                }
            }
        }))
    }
}
