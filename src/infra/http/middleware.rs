use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{Level, debug, error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_INBOUND_REQUEST_ID_LEN: usize = 128;

#[derive(Clone, Debug)]
pub struct RequestContext {
    pub request_id: String,
}

/// Tags the request with an id, reusing a well-formed inbound `x-request-id`
/// so storefront and back-office logs can be correlated.
pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = inbound_request_id(request.headers().get(REQUEST_ID_HEADER))
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let ctx = RequestContext { request_id };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&ctx.request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response.extensions_mut().insert(ctx);
    response
}

fn inbound_request_id(value: Option<&HeaderValue>) -> Option<String> {
    let value = value?.to_str().ok()?.trim();
    let well_formed = !value.is_empty()
        && value.len() <= MAX_INBOUND_REQUEST_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    well_formed.then(|| value.to_string())
}

/// Emits one event per response; failures carry the attached [`ErrorReport`].
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    let level = if status.is_server_error() {
        Level::ERROR
    } else if status.is_client_error() {
        Level::WARN
    } else {
        debug!(
            target = "vetrina::http::response",
            status = status.as_u16(),
            method = %method,
            path = %path,
            elapsed_ms,
            request_id = %request_id,
            "request served"
        );
        return response;
    };

    let (source, chain) = match response.extensions_mut().remove::<ErrorReport>() {
        Some(report) => (report.source, report.messages),
        None => ("unknown", Vec::new()),
    };
    let detail = chain.first().map(String::as_str).unwrap_or("no diagnostic");

    macro_rules! emit {
        ($event:ident, $message:literal) => {
            $event!(
                target = "vetrina::http::response",
                status = status.as_u16(),
                method = %method,
                path = %path,
                elapsed_ms,
                source,
                detail,
                chain = ?chain,
                request_id = %request_id,
                $message
            )
        };
    }

    if level == Level::ERROR {
        emit!(error, "request failed");
    } else {
        emit!(warn, "request rejected");
    }

    response
}
