//! Storefront routes: read-only catalogue, content and the contact form.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::application::admin::carousel::SlidePayload;
use crate::application::contact::ContactPayload;
use crate::application::error::ErrorReport;
use crate::cache::response_cache_layer;

use super::admin::authorize;
use super::error::{ApiError, JsonBody, PathParam, QueryParams};
use super::state::HttpState;

const SOURCE: &str = "infra::http::public";

pub(super) fn routes(state: &HttpState) -> Router<HttpState> {
    let cached = Router::new()
        .route("/api/announcements", get(announcements))
        .route("/api/products", get(products))
        .route("/api/products/{id}", get(product))
        .route("/api/categories", get(categories))
        .route("/api/categories/{slug}", get(category))
        .route(
            "/api/hero-carousel",
            get(carousel).post(create_carousel_item),
        )
        .route("/api/blog", get(blog))
        .route("/api/blog/{slug}", get(blog_post))
        .route("/api/settings", get(settings))
        .layer(middleware::from_fn_with_state(
            state.cache.clone(),
            response_cache_layer,
        ));

    let uncached = Router::new()
        .route("/api/contact", post(submit_contact))
        .route("/_health/db", get(db_health));

    cached.merge(uncached)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProductQuery {
    category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BlogQuery {
    limit: Option<usize>,
}

async fn announcements(State(state): State<HttpState>) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .storefront
        .announcements()
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(items))
}

async fn products(
    State(state): State<HttpState>,
    QueryParams(query): QueryParams<ProductQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|slug| !slug.is_empty());
    let items = state
        .storefront
        .products(category)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(items))
}

async fn product(
    State(state): State<HttpState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .storefront
        .product(id)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(item))
}

async fn categories(State(state): State<HttpState>) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .storefront
        .categories()
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(items))
}

async fn category(
    State(state): State<HttpState>,
    PathParam(slug): PathParam<String>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .storefront
        .category(&slug)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(page))
}

async fn carousel(State(state): State<HttpState>) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .storefront
        .carousel()
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(items))
}

/// Same operation as `POST /api/admin/hero-carousel`, reachable on the public prefix.
async fn create_carousel_item(
    State(state): State<HttpState>,
    headers: HeaderMap,
    JsonBody(payload): JsonBody<SlidePayload>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &headers)?;
    let created = state
        .admin
        .carousel
        .create(payload)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(created))
}

async fn blog(
    State(state): State<HttpState>,
    QueryParams(query): QueryParams<BlogQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state
        .storefront
        .blog(query.limit)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(posts))
}

async fn blog_post(
    State(state): State<HttpState>,
    PathParam(slug): PathParam<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .storefront
        .blog_post(&slug)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(post))
}

async fn settings(State(state): State<HttpState>) -> Result<impl IntoResponse, ApiError> {
    let map = state
        .storefront
        .settings()
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(map))
}

async fn submit_contact(
    State(state): State<HttpState>,
    JsonBody(payload): JsonBody<ContactPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let ack = state
        .contact
        .submit(payload)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(ack))
}

async fn db_health(State(state): State<HttpState>) -> Response {
    match state.storefront.database_health().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
