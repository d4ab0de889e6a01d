use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::application::repos::{CategoriesRepo, CategoryParams, CategorySummary};
use crate::application::validation::{optional_text, patch_required, patch_text, require};
use crate::cache::CacheTrigger;
use crate::domain::entities::CategoryRecord;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct AdminCategoryService {
    repo: Arc<dyn CategoriesRepo>,
    cache_trigger: Option<Arc<CacheTrigger>>,
}

impl AdminCategoryService {
    pub fn new(repo: Arc<dyn CategoriesRepo>) -> Self {
        Self {
            repo,
            cache_trigger: None,
        }
    }

    pub fn with_cache_trigger_opt(mut self, trigger: Option<Arc<CacheTrigger>>) -> Self {
        self.cache_trigger = trigger;
        self
    }

    pub async fn list(&self) -> Result<Vec<CategorySummary>, ServiceError> {
        self.repo
            .list_categories()
            .await
            .map_err(ServiceError::repo("Failed to fetch categories"))
    }

    pub async fn get(&self, id: Uuid) -> Result<CategoryRecord, ServiceError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(ServiceError::repo("Failed to fetch category"))?
            .ok_or_else(|| ServiceError::not_found("category"))
    }

    pub async fn create(&self, payload: CategoryPayload) -> Result<CategoryRecord, ServiceError> {
        require(&[("name", payload.name.as_deref())])?;
        let name = payload.name.unwrap_or_default().trim().to_string();
        let slug = resolve_slug(payload.slug.as_deref(), &name)?;

        let created = self
            .repo
            .create_category(CategoryParams {
                name,
                slug,
                description: optional_text(payload.description),
            })
            .await
            .map_err(ServiceError::repo("Failed to create category"))?;

        self.notify(&created.slug).await;
        Ok(created)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: CategoryPayload,
    ) -> Result<CategoryRecord, ServiceError> {
        let current = self.get(id).await?;
        let previous_slug = current.slug.clone();
        let name = patch_required(current.name, payload.name, "name")?;
        let slug = match payload.slug {
            Some(slug) => resolve_slug(Some(&slug), &name)?,
            None => current.slug,
        };

        let updated = self
            .repo
            .update_category(
                id,
                CategoryParams {
                    name,
                    slug,
                    description: patch_text(current.description, payload.description),
                },
            )
            .await
            .map_err(ServiceError::repo("Failed to update category"))?;

        if previous_slug != updated.slug {
            self.notify(&previous_slug).await;
        }
        self.notify(&updated.slug).await;
        Ok(updated)
    }

    /// Categories that still own products cannot be deleted.
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let owned = self
            .repo
            .count_products_in(id)
            .await
            .map_err(ServiceError::repo("Failed to delete category"))?;
        if owned > 0 {
            return Err(ServiceError::validation(format!(
                "Category still has {owned} products"
            )));
        }

        let deleted = self
            .repo
            .delete_category(id)
            .await
            .map_err(ServiceError::repo("Failed to delete category"))?;
        self.notify(&deleted.slug).await;
        Ok(())
    }

    async fn notify(&self, slug: &str) {
        if let Some(trigger) = &self.cache_trigger {
            trigger.category_changed(slug).await;
        }
    }
}

/// Explicit slugs are normalised; a blank or absent slug derives from `name`.
fn resolve_slug(explicit: Option<&str>, name: &str) -> Result<String, ServiceError> {
    let source = explicit
        .map(str::trim)
        .filter(|slug| !slug.is_empty())
        .unwrap_or(name);
    let slug = slug::slugify(source);
    if slug.is_empty() {
        return Err(ServiceError::validation("Slug is required"));
    }
    Ok(slug)
}
