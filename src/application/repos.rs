//! Repository traits describing persistence adapters.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{
    AnnouncementRecord, BlogPostRecord, CategoryRecord, ContactSubmissionRecord, HeroSlideRecord,
    ProductDetail, ProductListing, SiteSettingRecord,
};
use crate::domain::money::Money;
use crate::domain::types::{AnnouncementKind, AnnouncementStatus, ProductStatus};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
    #[error("database unavailable: {0}")]
    Unavailable(String),
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }

    /// Whether the store could not be reached or did not answer in time.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, RepoError::Timeout | RepoError::Unavailable(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductImageParams {
    pub url: String,
    pub alt_text: Option<String>,
    pub sequence: i32,
    pub is_active: bool,
}

/// Fully resolved product values written by create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductParams {
    pub title: String,
    pub original_price: Option<Money>,
    pub sale_price: Money,
    pub status: ProductStatus,
    pub is_active: bool,
    pub is_featured: bool,
    pub image: Option<String>,
    pub badge: Option<String>,
    pub description: Option<String>,
    pub category_id: Uuid,
    /// `None` leaves the stored gallery untouched; `Some` replaces it.
    pub images: Option<Vec<ProductImageParams>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProductCounts {
    pub total: u64,
    pub active: u64,
}

#[async_trait]
pub trait ProductsRepo: Send + Sync {
    /// Every product with its category, newest first.
    async fn list_listings(&self) -> Result<Vec<ProductListing>, RepoError>;

    async fn find_detail(&self, id: Uuid) -> Result<Option<ProductDetail>, RepoError>;

    async fn create_product(&self, params: ProductParams) -> Result<ProductDetail, RepoError>;

    async fn update_product(
        &self,
        id: Uuid,
        params: ProductParams,
    ) -> Result<ProductDetail, RepoError>;

    /// Removes the product and its images atomically.
    async fn delete_product(&self, id: Uuid) -> Result<ProductDetail, RepoError>;

    async fn count_products(&self) -> Result<ProductCounts, RepoError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryParams {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

/// Category with the number of active products it owns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    #[serde(flatten)]
    pub category: CategoryRecord,
    pub product_count: u64,
}

#[async_trait]
pub trait CategoriesRepo: Send + Sync {
    /// All categories ordered by name.
    async fn list_categories(&self) -> Result<Vec<CategorySummary>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<CategoryRecord>, RepoError>;

    async fn create_category(&self, params: CategoryParams) -> Result<CategoryRecord, RepoError>;

    async fn update_category(
        &self,
        id: Uuid,
        params: CategoryParams,
    ) -> Result<CategoryRecord, RepoError>;

    async fn delete_category(&self, id: Uuid) -> Result<CategoryRecord, RepoError>;

    /// Products of any state that reference the category.
    async fn count_products_in(&self, id: Uuid) -> Result<u64, RepoError>;

    async fn count_categories(&self) -> Result<u64, RepoError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnouncementParams {
    pub title: String,
    pub message: String,
    pub kind: AnnouncementKind,
    pub status: AnnouncementStatus,
    pub is_visible: bool,
    pub priority: i32,
    pub background_color: String,
    pub text_color: String,
    pub is_scrolling: bool,
    pub show_close_button: bool,
    pub auto_hide: bool,
    pub auto_hide_delay: i32,
    pub start_date: Option<OffsetDateTime>,
    pub end_date: Option<OffsetDateTime>,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
}

#[async_trait]
pub trait AnnouncementsRepo: Send + Sync {
    /// All announcements, highest priority first then newest.
    async fn list_announcements(&self) -> Result<Vec<AnnouncementRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AnnouncementRecord>, RepoError>;

    async fn create_announcement(
        &self,
        params: AnnouncementParams,
    ) -> Result<AnnouncementRecord, RepoError>;

    async fn update_announcement(
        &self,
        id: Uuid,
        params: AnnouncementParams,
    ) -> Result<AnnouncementRecord, RepoError>;

    async fn delete_announcement(&self, id: Uuid) -> Result<(), RepoError>;

    async fn count_announcements(&self) -> Result<u64, RepoError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSlideParams {
    pub name: String,
    pub image_url: String,
    /// `None` appends after the current highest sequence.
    pub sequence: Option<i32>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSlideParams {
    pub name: String,
    pub image_url: String,
    pub sequence: i32,
    pub is_active: bool,
}

#[async_trait]
pub trait CarouselRepo: Send + Sync {
    /// All slides by ascending sequence, then creation time.
    async fn list_slides(&self) -> Result<Vec<HeroSlideRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<HeroSlideRecord>, RepoError>;

    async fn create_slide(&self, params: CreateSlideParams) -> Result<HeroSlideRecord, RepoError>;

    async fn update_slide(
        &self,
        id: Uuid,
        params: UpdateSlideParams,
    ) -> Result<HeroSlideRecord, RepoError>;

    async fn delete_slide(&self, id: Uuid) -> Result<(), RepoError>;

    async fn count_slides(&self) -> Result<u64, RepoError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlogPostParams {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub is_published: bool,
    pub published_at: Option<OffsetDateTime>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub tags: Vec<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BlogCounts {
    pub total: u64,
    pub published: u64,
}

#[async_trait]
pub trait BlogRepo: Send + Sync {
    /// All posts, newest first.
    async fn list_posts(&self) -> Result<Vec<BlogPostRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<BlogPostRecord>, RepoError>;

    async fn create_post(&self, params: BlogPostParams) -> Result<BlogPostRecord, RepoError>;

    async fn update_post(
        &self,
        id: Uuid,
        params: BlogPostParams,
    ) -> Result<BlogPostRecord, RepoError>;

    async fn delete_post(&self, id: Uuid) -> Result<BlogPostRecord, RepoError>;

    async fn count_posts(&self) -> Result<BlogCounts, RepoError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

#[async_trait]
pub trait ContactRepo: Send + Sync {
    async fn create_submission(
        &self,
        submission: NewContactSubmission,
    ) -> Result<ContactSubmissionRecord, RepoError>;

    /// All submissions, newest first.
    async fn list_submissions(&self) -> Result<Vec<ContactSubmissionRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContactSubmissionRecord>, RepoError>;

    async fn count_submissions(&self) -> Result<u64, RepoError>;
}

/// One entry of a bulk settings write.
///
/// Metadata left as `None` keeps the stored value on update and falls back to
/// the column default on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingUpsert {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub setting_type: Option<String>,
}

#[async_trait]
pub trait SettingsRepo: Send + Sync {
    /// All settings ordered by category, then key.
    async fn list_settings(&self) -> Result<Vec<SiteSettingRecord>, RepoError>;

    /// Applies every entry or none of them.
    ///
    /// Exceeding `budget` rolls the batch back and yields [`RepoError::Timeout`].
    async fn upsert_batch(
        &self,
        entries: Vec<SettingUpsert>,
        budget: Duration,
    ) -> Result<Vec<SiteSettingRecord>, RepoError>;

    /// Inserts entries whose key is absent and returns how many were created.
    async fn insert_missing(&self, entries: Vec<SettingUpsert>) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
