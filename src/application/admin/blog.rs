use std::sync::Arc;

use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::application::repos::{BlogPostParams, BlogRepo};
use crate::application::validation::{
    double_option, normalize_tags, optional_text, patch_required, patch_text, patch_timestamp,
    require,
};
use crate::cache::CacheTrigger;
use crate::domain::entities::BlogPostRecord;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostPayload {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub is_published: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub published_at: Option<Option<String>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
}

#[derive(Clone)]
pub struct AdminBlogService {
    repo: Arc<dyn BlogRepo>,
    cache_trigger: Option<Arc<CacheTrigger>>,
}

impl AdminBlogService {
    pub fn new(repo: Arc<dyn BlogRepo>) -> Self {
        Self {
            repo,
            cache_trigger: None,
        }
    }

    pub fn with_cache_trigger_opt(mut self, trigger: Option<Arc<CacheTrigger>>) -> Self {
        self.cache_trigger = trigger;
        self
    }

    pub async fn list(&self) -> Result<Vec<BlogPostRecord>, ServiceError> {
        self.repo
            .list_posts()
            .await
            .map_err(ServiceError::repo("Failed to fetch blog posts"))
    }

    pub async fn get(&self, id: Uuid) -> Result<BlogPostRecord, ServiceError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(ServiceError::repo("Failed to fetch blog post"))?
            .ok_or_else(|| ServiceError::not_found("blog post"))
    }

    pub async fn create(&self, payload: BlogPostPayload) -> Result<BlogPostRecord, ServiceError> {
        require(&[
            ("title", payload.title.as_deref()),
            ("slug", payload.slug.as_deref()),
            ("content", payload.content.as_deref()),
        ])?;

        let is_published = payload.is_published.unwrap_or(false);
        let requested = patch_timestamp(None, payload.published_at, "publish date")?;
        let params = BlogPostParams {
            title: payload.title.unwrap_or_default().trim().to_string(),
            slug: payload.slug.unwrap_or_default().trim().to_string(),
            content: payload.content.unwrap_or_default(),
            excerpt: optional_text(payload.excerpt),
            featured_image: optional_text(payload.featured_image),
            is_published,
            published_at: publication_time(is_published, requested, OffsetDateTime::now_utc()),
            meta_title: optional_text(payload.meta_title),
            meta_description: optional_text(payload.meta_description),
            tags: normalize_tags(payload.tags.unwrap_or_default()),
            author_name: optional_text(payload.author_name),
            author_email: optional_text(payload.author_email),
        };

        let created = self
            .repo
            .create_post(params)
            .await
            .map_err(ServiceError::repo("Failed to create blog post"))?;
        self.notify(&created.slug).await;
        Ok(created)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: BlogPostPayload,
    ) -> Result<BlogPostRecord, ServiceError> {
        let current = self.get(id).await?;
        let previous_slug = current.slug.clone();

        let is_published = payload.is_published.unwrap_or(current.is_published);
        let requested = patch_timestamp(current.published_at, payload.published_at, "publish date")?;
        let content = match payload.content {
            Some(content) if content.trim().is_empty() => {
                return Err(ServiceError::validation("Content is required"));
            }
            Some(content) => content,
            None => current.content,
        };
        let params = BlogPostParams {
            title: patch_required(current.title, payload.title, "title")?,
            slug: patch_required(current.slug, payload.slug, "slug")?,
            content,
            excerpt: patch_text(current.excerpt, payload.excerpt),
            featured_image: patch_text(current.featured_image, payload.featured_image),
            is_published,
            published_at: publication_time(is_published, requested, OffsetDateTime::now_utc()),
            meta_title: patch_text(current.meta_title, payload.meta_title),
            meta_description: patch_text(current.meta_description, payload.meta_description),
            tags: payload.tags.map(normalize_tags).unwrap_or(current.tags),
            author_name: patch_text(current.author_name, payload.author_name),
            author_email: patch_text(current.author_email, payload.author_email),
        };

        let updated = self
            .repo
            .update_post(id, params)
            .await
            .map_err(ServiceError::repo("Failed to update blog post"))?;

        if previous_slug != updated.slug {
            self.notify(&previous_slug).await;
        }
        self.notify(&updated.slug).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let deleted = self
            .repo
            .delete_post(id)
            .await
            .map_err(ServiceError::repo("Failed to delete blog post"))?;
        self.notify(&deleted.slug).await;
        Ok(())
    }

    async fn notify(&self, slug: &str) {
        if let Some(trigger) = &self.cache_trigger {
            trigger.blog_post_changed(slug).await;
        }
    }
}

/// Published posts always carry a date; drafts never do.
fn publication_time(
    is_published: bool,
    requested: Option<OffsetDateTime>,
    now: OffsetDateTime,
) -> Option<OffsetDateTime> {
    if is_published {
        Some(requested.unwrap_or(now))
    } else {
        None
    }
}
