//! Response cache middleware for public GET routes.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::counter;
use tracing::{debug, instrument};

use super::{CacheConfig, ResponseKey, ResponseStore, store::CachedResponse};

const METRIC_HIT_TOTAL: &str = "vetrina_cache_l1_hit_total";
const METRIC_MISS_TOTAL: &str = "vetrina_cache_l1_miss_total";

#[derive(Clone)]
pub struct CacheState {
    pub config: CacheConfig,
    pub store: Arc<ResponseStore>,
}

/// Serves cached 200 responses for GET requests and stores fresh ones.
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn response_cache_layer(
    State(cache): State<CacheState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !cache.config.enable_response_cache || request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = ResponseKey::new(request.uri().path(), request.uri().query());
    if let Some(cached) = cache.store.get(&key) {
        counter!(METRIC_HIT_TOTAL).increment(1);
        debug!(cache = "response", outcome = "hit", "serving cached response");
        return build_response(cached);
    }
    counter!(METRIC_MISS_TOTAL).increment(1);

    let generation = cache.store.generation();
    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };
    if bytes.len() > cache.config.response_body_limit_bytes {
        debug!(cache = "response", outcome = "oversized", "response not cached");
        return Response::from_parts(parts, Body::from(bytes));
    }

    let cached = CachedResponse {
        status: parts.status.as_u16(),
        headers: parts
            .headers
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect(),
        body: bytes.clone(),
        stored_at: Instant::now(),
    };
    if cache.store.set_if_current(key, cached, generation) {
        debug!(cache = "response", outcome = "miss", "caching response");
    } else {
        debug!(cache = "response", outcome = "superseded", "invalidated while rendering");
    }

    Response::from_parts(parts, Body::from(bytes))
}

fn build_response(cached: CachedResponse) -> Response {
    let mut builder = Response::builder().status(cached.status);
    for (name, value) in cached.headers {
        if let Ok(header_value) = HeaderValue::from_str(&value) {
            builder = builder.header(name, header_value);
        }
    }
    builder
        .body(Body::from(cached.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
