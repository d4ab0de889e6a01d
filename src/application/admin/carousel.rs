use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::application::repos::{CarouselRepo, CreateSlideParams, UpdateSlideParams};
use crate::application::validation::{patch_required, require};
use crate::cache::CacheTrigger;
use crate::domain::entities::HeroSlideRecord;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlidePayload {
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub sequence: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct AdminCarouselService {
    repo: Arc<dyn CarouselRepo>,
    cache_trigger: Option<Arc<CacheTrigger>>,
}

impl AdminCarouselService {
    pub fn new(repo: Arc<dyn CarouselRepo>) -> Self {
        Self {
            repo,
            cache_trigger: None,
        }
    }

    pub fn with_cache_trigger_opt(mut self, trigger: Option<Arc<CacheTrigger>>) -> Self {
        self.cache_trigger = trigger;
        self
    }

    pub async fn list(&self) -> Result<Vec<HeroSlideRecord>, ServiceError> {
        self.repo
            .list_slides()
            .await
            .map_err(ServiceError::repo("Failed to fetch hero carousel"))
    }

    pub async fn get(&self, id: Uuid) -> Result<HeroSlideRecord, ServiceError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(ServiceError::repo("Failed to fetch carousel item"))?
            .ok_or_else(|| ServiceError::not_found("carousel item"))
    }

    /// Without an explicit sequence the slide is appended after the highest one.
    pub async fn create(&self, payload: SlidePayload) -> Result<HeroSlideRecord, ServiceError> {
        require(&[
            ("name", payload.name.as_deref()),
            ("image URL", payload.image_url.as_deref()),
        ])?;

        let created = self
            .repo
            .create_slide(CreateSlideParams {
                name: payload.name.unwrap_or_default().trim().to_string(),
                image_url: payload.image_url.unwrap_or_default().trim().to_string(),
                sequence: payload.sequence,
                is_active: payload.is_active.unwrap_or(true),
            })
            .await
            .map_err(ServiceError::repo("Failed to create carousel item"))?;
        self.notify().await;
        Ok(created)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: SlidePayload,
    ) -> Result<HeroSlideRecord, ServiceError> {
        let current = self.get(id).await?;
        let params = UpdateSlideParams {
            name: patch_required(current.name, payload.name, "name")?,
            image_url: patch_required(current.image_url, payload.image_url, "image URL")?,
            sequence: payload.sequence.unwrap_or(current.sequence),
            is_active: payload.is_active.unwrap_or(current.is_active),
        };

        let updated = self
            .repo
            .update_slide(id, params)
            .await
            .map_err(ServiceError::repo("Failed to update carousel item"))?;
        self.notify().await;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.repo
            .delete_slide(id)
            .await
            .map_err(ServiceError::repo("Failed to delete carousel item"))?;
        self.notify().await;
        Ok(())
    }

    async fn notify(&self) {
        if let Some(trigger) = &self.cache_trigger {
            trigger.carousel_changed().await;
        }
    }
}
