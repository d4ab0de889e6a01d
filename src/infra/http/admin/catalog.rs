//! Products and categories.

use axum::{Json, extract::State, response::IntoResponse};
use uuid::Uuid;

use crate::application::admin::categories::CategoryPayload;
use crate::application::admin::products::ProductPayload;

use super::super::error::{ApiError, JsonBody, PathParam};
use super::super::state::HttpState;
use super::{SOURCE, SUCCESS};

pub(super) async fn list_products(
    State(state): State<HttpState>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .admin
        .products
        .list()
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(items))
}

pub(super) async fn get_product(
    State(state): State<HttpState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .admin
        .products
        .get(id)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(item))
}

pub(super) async fn create_product(
    State(state): State<HttpState>,
    JsonBody(payload): JsonBody<ProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state
        .admin
        .products
        .create(payload)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(created))
}

pub(super) async fn update_product(
    State(state): State<HttpState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<ProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .admin
        .products
        .update(id, payload)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(updated))
}

pub(super) async fn delete_product(
    State(state): State<HttpState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .admin
        .products
        .delete(id)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(SUCCESS))
}

pub(super) async fn list_categories(
    State(state): State<HttpState>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .admin
        .categories
        .list()
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(items))
}

pub(super) async fn get_category(
    State(state): State<HttpState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .admin
        .categories
        .get(id)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(item))
}

pub(super) async fn create_category(
    State(state): State<HttpState>,
    JsonBody(payload): JsonBody<CategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state
        .admin
        .categories
        .create(payload)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(created))
}

pub(super) async fn update_category(
    State(state): State<HttpState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<CategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .admin
        .categories
        .update(id, payload)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(updated))
}

/// Refused with 400 while the category still owns products.
pub(super) async fn delete_category(
    State(state): State<HttpState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .admin
        .categories
        .delete(id)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, err))?;
    Ok(Json(SUCCESS))
}
