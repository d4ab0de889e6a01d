use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::application::repos::{
    CategoriesRepo, ProductImageParams, ProductParams, ProductsRepo,
};
use crate::application::validation::{
    double_option, optional_text, patch_required, patch_text, required_message,
};
use crate::cache::CacheTrigger;
use crate::domain::entities::{ProductDetail, ProductListing};
use crate::domain::money::Money;
use crate::domain::types::ProductStatus;

const REQUIRED_FIELDS: [&str; 3] = ["title", "sale price", "category"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImagePayload {
    pub url: Option<String>,
    pub alt_text: Option<String>,
    pub sequence: Option<i32>,
    pub is_active: Option<bool>,
}

/// Body of product create and update requests.
///
/// On update every field is optional; absent fields keep the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub original_price: Option<Option<Money>>,
    pub sale_price: Option<Money>,
    pub status: Option<ProductStatus>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub image: Option<String>,
    pub badge: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub images: Option<Vec<ProductImagePayload>>,
}

#[derive(Clone)]
pub struct AdminProductService {
    products: Arc<dyn ProductsRepo>,
    categories: Arc<dyn CategoriesRepo>,
    cache_trigger: Option<Arc<CacheTrigger>>,
}

impl AdminProductService {
    pub fn new(products: Arc<dyn ProductsRepo>, categories: Arc<dyn CategoriesRepo>) -> Self {
        Self {
            products,
            categories,
            cache_trigger: None,
        }
    }

    pub fn with_cache_trigger_opt(mut self, trigger: Option<Arc<CacheTrigger>>) -> Self {
        self.cache_trigger = trigger;
        self
    }

    pub async fn list(&self) -> Result<Vec<ProductListing>, ServiceError> {
        self.products
            .list_listings()
            .await
            .map_err(ServiceError::repo("Failed to fetch products"))
    }

    pub async fn get(&self, id: Uuid) -> Result<ProductDetail, ServiceError> {
        self.products
            .find_detail(id)
            .await
            .map_err(ServiceError::repo("Failed to fetch product"))?
            .ok_or_else(|| ServiceError::not_found("product"))
    }

    pub async fn create(&self, payload: ProductPayload) -> Result<ProductDetail, ServiceError> {
        let (Some(title), Some(sale_price), Some(category_id)) = (
            optional_text(payload.title),
            payload.sale_price,
            payload.category_id,
        ) else {
            return Err(ServiceError::validation(required_message(&REQUIRED_FIELDS)));
        };
        self.ensure_category(category_id).await?;

        let params = ProductParams {
            title,
            original_price: payload.original_price.flatten(),
            sale_price,
            status: payload.status.unwrap_or_default(),
            is_active: payload.is_active.unwrap_or(true),
            is_featured: payload.is_featured.unwrap_or(false),
            image: optional_text(payload.image),
            badge: optional_text(payload.badge),
            description: optional_text(payload.description),
            category_id,
            images: Some(image_params(payload.images.unwrap_or_default())?),
        };
        let created = self
            .products
            .create_product(params)
            .await
            .map_err(ServiceError::repo("Failed to create product"))?;

        info!(
            target = "vetrina::application::admin::products",
            product_id = %created.product.id,
            "product created"
        );
        self.notify(created.product.id).await;
        Ok(created)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: ProductPayload,
    ) -> Result<ProductDetail, ServiceError> {
        let current = self.get(id).await?.product;
        if let Some(category_id) = payload.category_id {
            self.ensure_category(category_id).await?;
        }

        let params = ProductParams {
            title: patch_required(current.title, payload.title, "title")?,
            original_price: payload.original_price.unwrap_or(current.original_price),
            sale_price: payload.sale_price.unwrap_or(current.sale_price),
            status: payload.status.unwrap_or(current.status),
            is_active: payload.is_active.unwrap_or(current.is_active),
            is_featured: payload.is_featured.unwrap_or(current.is_featured),
            image: patch_text(current.image, payload.image),
            badge: patch_text(current.badge, payload.badge),
            description: patch_text(current.description, payload.description),
            category_id: payload.category_id.unwrap_or(current.category_id),
            images: payload.images.map(image_params).transpose()?,
        };
        let updated = self
            .products
            .update_product(id, params)
            .await
            .map_err(ServiceError::repo("Failed to update product"))?;

        self.notify(id).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.products
            .delete_product(id)
            .await
            .map_err(ServiceError::repo("Failed to delete product"))?;

        info!(
            target = "vetrina::application::admin::products",
            product_id = %id,
            "product deleted with its images"
        );
        self.notify(id).await;
        Ok(())
    }

    async fn ensure_category(&self, id: Uuid) -> Result<(), ServiceError> {
        self.categories
            .find_by_id(id)
            .await
            .map_err(ServiceError::repo("Failed to fetch category"))?
            .map(|_| ())
            .ok_or_else(|| ServiceError::validation("Category does not exist"))
    }

    async fn notify(&self, id: Uuid) {
        if let Some(trigger) = &self.cache_trigger {
            trigger.product_changed(id).await;
        }
    }
}

/// Image sequence defaults to the position in the submitted list.
fn image_params(images: Vec<ProductImagePayload>) -> Result<Vec<ProductImageParams>, ServiceError> {
    images
        .into_iter()
        .enumerate()
        .map(|(index, image)| {
            let url = optional_text(image.url)
                .ok_or_else(|| ServiceError::validation("Image url is required"))?;
            let fallback = i32::try_from(index)
                .map_err(|_| ServiceError::validation("Too many product images"))?;
            Ok(ProductImageParams {
                url,
                alt_text: optional_text(image.alt_text),
                sequence: image.sequence.unwrap_or(fallback),
                is_active: image.is_active.unwrap_or(true),
            })
        })
        .collect()
}
