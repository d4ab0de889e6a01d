//! Back-office routes under `/api/admin`, guarded by the shared admin secret.

mod catalog;
mod content;
mod site;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Serialize;

use crate::application::error::ServiceError;

use super::error::ApiError;
use super::state::HttpState;

const SOURCE: &str = "infra::http::admin";
const BASIC_CHALLENGE: &str = "Basic realm=\"vetrina-admin\"";

#[derive(Debug, Serialize)]
struct Success {
    success: bool,
}

const SUCCESS: Success = Success { success: true };

pub(super) fn routes(state: &HttpState) -> Router<HttpState> {
    let guarded = Router::new()
        .route(
            "/api/admin/products",
            get(catalog::list_products).post(catalog::create_product),
        )
        .route(
            "/api/admin/products/{id}",
            get(catalog::get_product)
                .put(catalog::update_product)
                .delete(catalog::delete_product),
        )
        .route(
            "/api/admin/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            "/api/admin/categories/{id}",
            get(catalog::get_category)
                .put(catalog::update_category)
                .delete(catalog::delete_category),
        )
        .route(
            "/api/admin/announcements",
            get(content::list_announcements).post(content::create_announcement),
        )
        .route(
            "/api/admin/announcements/{id}",
            get(content::get_announcement)
                .put(content::update_announcement)
                .delete(content::delete_announcement),
        )
        .route(
            "/api/admin/hero-carousel",
            get(content::list_slides).post(content::create_slide),
        )
        .route(
            "/api/admin/hero-carousel/{id}",
            get(content::get_slide)
                .put(content::update_slide)
                .delete(content::delete_slide),
        )
        .route(
            "/api/admin/blog",
            get(content::list_posts).post(content::create_post),
        )
        .route(
            "/api/admin/blog/{id}",
            get(content::get_post)
                .put(content::update_post)
                .delete(content::delete_post),
        )
        .route("/api/admin/contact", get(site::list_contact))
        .route("/api/admin/contact/{id}", get(site::get_contact))
        .route(
            "/api/admin/settings",
            get(site::list_settings).put(site::update_settings),
        )
        .route(
            "/api/admin/settings/initialize",
            post(site::initialize_settings),
        )
        .route("/api/admin/upload", post(site::issue_upload))
        .route("/api/admin/dashboard-stats", get(site::dashboard_stats))
        .route("/api/admin/cache/invalidate", post(site::invalidate_cache))
        .layer(middleware::from_fn_with_state(state.clone(), admin_guard));

    Router::new()
        .route("/api/admin/auth", post(site::login))
        .merge(guarded)
}

/// Checks HTTP Basic credentials against the shared admin secret.
///
/// A no-op when admin protection is disabled.
pub(super) fn authorize(state: &HttpState, headers: &HeaderMap) -> Result<(), ApiError> {
    if !state.protect_admin {
        return Ok(());
    }

    let (username, password) = basic_credentials(headers).unwrap_or_default();
    state
        .admin
        .auth
        .verify(&username, &password)
        .map_err(|err| ApiError::from_service(SOURCE, ServiceError::from(err)))
}

async fn admin_guard(
    State(state): State<HttpState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match authorize(&state, request.headers()) {
        Ok(()) => next.run(request).await,
        Err(err) => {
            let challenge = err.status() == StatusCode::UNAUTHORIZED;
            let mut response = err.into_response();
            if challenge {
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static(BASIC_CHALLENGE),
                );
            }
            response
        }
    }
}

fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = raw
        .strip_prefix("Basic ")
        .or_else(|| raw.strip_prefix("basic "))?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}
