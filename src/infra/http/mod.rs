//! JSON API surface: storefront reads under `/api` and the back-office under `/api/admin`.

mod admin;
mod error;
mod middleware;
mod public;
mod state;

pub use error::{ApiError, JsonBody, PathParam, QueryParams};
pub use middleware::{REQUEST_ID_HEADER, RequestContext};
pub use state::{AdminServices, HttpState};

use axum::{Router, middleware as axum_middleware};

/// Assembles every route with request-id tagging and response logging.
pub fn build_router(state: HttpState) -> Router {
    public::routes(&state)
        .merge(admin::routes(&state))
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}
