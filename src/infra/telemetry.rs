use std::sync::Once;

use metrics::{Unit, describe_counter, describe_gauge, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "vetrina_cache_l1_hit_total",
            Unit::Count,
            "Public API responses served from the response cache."
        );
        describe_counter!(
            "vetrina_cache_l1_miss_total",
            Unit::Count,
            "Public API requests that missed the response cache."
        );
        describe_counter!(
            "vetrina_cache_l1_evict_total",
            Unit::Count,
            "Response-cache entries evicted for capacity."
        );
        describe_gauge!(
            "vetrina_cache_event_queue_len",
            Unit::Count,
            "Invalidation events waiting to be consumed."
        );
        describe_histogram!(
            "vetrina_cache_consume_ms",
            Unit::Milliseconds,
            "Time spent turning queued events into local evictions."
        );
        describe_counter!(
            "vetrina_revalidation_total",
            Unit::Count,
            "Remote revalidation calls by outcome."
        );
        describe_histogram!(
            "vetrina_settings_batch_ms",
            Unit::Milliseconds,
            "Duration of atomic settings batch writes."
        );
    });
}
