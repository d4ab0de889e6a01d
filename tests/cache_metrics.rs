use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
    middleware,
    routing::get,
};
use metrics_util::debugging::DebuggingRecorder;
use tower::ServiceExt;
use vetrina::cache::{
    CacheConfig, CacheConsumer, CacheState, EventKind, EventQueue, ResponseStore,
    RevalidationError, Revalidator, response_cache_layer,
};

struct Accepting;

#[async_trait]
impl Revalidator for Accepting {
    async fn revalidate(&self, _paths: &[String]) -> Result<(), RevalidationError> {
        Ok(())
    }
}

#[tokio::test]
async fn cache_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    // Response store: one slot, so the third distinct path evicts.
    let config = CacheConfig {
        response_limit: 1,
        ..Default::default()
    };
    let store = Arc::new(ResponseStore::new(&config));
    let cache_state = CacheState {
        config: config.clone(),
        store: store.clone(),
    };

    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/api/blog",
            get({
                let calls = Arc::clone(&calls);
                move || {
                    let calls = Arc::clone(&calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        "[]"
                    }
                }
            }),
        )
        .layer(middleware::from_fn_with_state(
            cache_state,
            response_cache_layer,
        ));

    for uri in ["/api/blog", "/api/blog", "/api/blog?limit=1"] {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .expect("request should build");
        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond");
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // Queue gauge, consumption latency and remote outcome.
    let queue = Arc::new(EventQueue::new());
    let consumer = CacheConsumer::new(config, store, queue.clone(), Some(Arc::new(Accepting)));
    queue.publish(EventKind::BlogPostChanged {
        slug: "lookbook".into(),
    });
    let report = consumer.consume().await.expect("events were queued");
    if let Some(remote) = report.remote {
        remote.await.expect("remote task");
    }

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "vetrina_cache_l1_hit_total",
        "vetrina_cache_l1_miss_total",
        "vetrina_cache_l1_evict_total",
        "vetrina_cache_event_queue_len",
        "vetrina_cache_consume_ms",
        "vetrina_revalidation_total",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
