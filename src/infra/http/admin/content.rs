//! Announcements, hero slides and blog posts.

use axum::{Json, extract::State, response::IntoResponse};
use uuid::Uuid;

use crate::application::admin::announcements::AnnouncementPayload;
use crate::application::admin::blog::BlogPostPayload;
use crate::application::admin::carousel::SlidePayload;

use super::super::error::{ApiError, JsonBody, PathParam};
use super::super::state::HttpState;
use super::{SOURCE, SUCCESS};

pub(super) async fn list_announcements(
    State(state): State<HttpState>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .admin
        .announcements
        .list()
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(items))
}

pub(super) async fn get_announcement(
    State(state): State<HttpState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .admin
        .announcements
        .get(id)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(item))
}

pub(super) async fn create_announcement(
    State(state): State<HttpState>,
    JsonBody(payload): JsonBody<AnnouncementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state
        .admin
        .announcements
        .create(payload)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(created))
}

pub(super) async fn update_announcement(
    State(state): State<HttpState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<AnnouncementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .admin
        .announcements
        .update(id, payload)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(updated))
}

pub(super) async fn delete_announcement(
    State(state): State<HttpState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .admin
        .announcements
        .delete(id)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(SUCCESS))
}

pub(super) async fn list_slides(
    State(state): State<HttpState>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .admin
        .carousel
        .list()
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(items))
}

pub(super) async fn get_slide(
    State(state): State<HttpState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .admin
        .carousel
        .get(id)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(item))
}

pub(super) async fn create_slide(
    State(state): State<HttpState>,
    JsonBody(payload): JsonBody<SlidePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state
        .admin
        .carousel
        .create(payload)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(created))
}

pub(super) async fn update_slide(
    State(state): State<HttpState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<SlidePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .admin
        .carousel
        .update(id, payload)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(updated))
}

pub(super) async fn delete_slide(
    State(state): State<HttpState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .admin
        .carousel
        .delete(id)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(SUCCESS))
}

/// Drafts included, newest first.
pub(super) async fn list_posts(
    State(state): State<HttpState>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .admin
        .blog
        .list()
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(items))
}

pub(super) async fn get_post(
    State(state): State<HttpState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .admin
        .blog
        .get(id)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(item))
}

pub(super) async fn create_post(
    State(state): State<HttpState>,
    JsonBody(payload): JsonBody<BlogPostPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state
        .admin
        .blog
        .create(payload)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(created))
}

pub(super) async fn update_post(
    State(state): State<HttpState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<BlogPostPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .admin
        .blog
        .update(id, payload)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(updated))
}

pub(super) async fn delete_post(
    State(state): State<HttpState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .admin
        .blog
        .delete(id)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(SUCCESS))
}
