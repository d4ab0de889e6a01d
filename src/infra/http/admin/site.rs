//! Contact inbox, site settings, uploads, dashboard, cache control and login.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::application::admin::auth::LoginPayload;
use crate::application::admin::settings::SettingsBatchPayload;
use crate::application::admin::uploads::UploadPayload;

use super::super::error::{ApiError, JsonBody, PathParam};
use super::super::state::HttpState;
use super::SOURCE;

#[derive(Debug, Serialize)]
struct InvalidateResponse {
    success: bool,
    events: usize,
    evicted: usize,
    paths: Vec<String>,
}

pub(super) async fn list_contact(
    State(state): State<HttpState>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .contact
        .list()
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(items))
}

pub(super) async fn get_contact(
    State(state): State<HttpState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .contact
        .get(id)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(item))
}

pub(super) async fn list_settings(
    State(state): State<HttpState>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .admin
        .settings
        .list()
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(items))
}

/// All-or-nothing batch upsert.
pub(super) async fn update_settings(
    State(state): State<HttpState>,
    JsonBody(payload): JsonBody<SettingsBatchPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let saved = state
        .admin
        .settings
        .update(payload)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(saved))
}

pub(super) async fn initialize_settings(
    State(state): State<HttpState>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .admin
        .settings
        .initialize()
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(outcome))
}

pub(super) async fn issue_upload(
    State(state): State<HttpState>,
    JsonBody(payload): JsonBody<UploadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = state
        .admin
        .uploads
        .issue(payload)
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(ticket))
}

pub(super) async fn dashboard_stats(
    State(state): State<HttpState>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state
        .admin
        .dashboard
        .stats()
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(stats))
}

/// Evicts every storefront surface and asks the remote layer to revalidate.
pub(super) async fn invalidate_cache(
    State(state): State<HttpState>,
) -> Result<impl IntoResponse, ApiError> {
    let response = match state.cache_trigger.full_refresh().await {
        Some(report) => InvalidateResponse {
            success: true,
            events: report.event_count,
            evicted: report.evicted,
            paths: report.plan.page_paths(),
        },
        None => InvalidateResponse {
            success: true,
            events: 0,
            evicted: 0,
            paths: Vec::new(),
        },
    };

    info!(
        target = "vetrina::http::admin",
        events = response.events,
        evicted = response.evicted,
        "manual cache invalidation"
    );
    Ok(Json(response))
}

pub(super) async fn login(
    State(state): State<HttpState>,
    JsonBody(payload): JsonBody<LoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .admin
        .auth
        .login(payload)
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(outcome))
}
