//! In-memory stores and a router builder shared by the HTTP integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use serde_json::Value;
use time::OffsetDateTime;
use time::macros::datetime;
use tokio::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

use vetrina::application::admin::{
    announcements::AdminAnnouncementService,
    auth::{AdminAuthService, Credentials},
    blog::AdminBlogService,
    carousel::AdminCarouselService,
    categories::AdminCategoryService,
    dashboard::AdminDashboardService,
    products::AdminProductService,
    settings::AdminSettingsService,
    uploads::{AdminUploadService, PresignedUpload, SignerError, UploadSigner},
};
use vetrina::application::contact::ContactService;
use vetrina::application::repos::{
    AnnouncementParams, AnnouncementsRepo, BlogCounts, BlogPostParams, BlogRepo, CarouselRepo,
    CategoriesRepo, CategoryParams, CategorySummary, ContactRepo, CreateSlideParams, HealthRepo,
    NewContactSubmission, ProductCounts, ProductParams, ProductsRepo, RepoError, SettingUpsert,
    SettingsRepo, UpdateSlideParams,
};
use vetrina::application::storefront::{StorefrontRepos, StorefrontService};
use vetrina::cache::{
    CacheConfig, CacheConsumer, CacheState, CacheTrigger, EventQueue, ResponseStore,
    RevalidationError, Revalidator,
};
use vetrina::domain::entities::{
    AnnouncementRecord, BlogPostRecord, CategoryRecord, ContactSubmissionRecord, HeroSlideRecord,
    ProductDetail, ProductImageRecord, ProductListing, ProductRecord, SiteSettingRecord,
};
use vetrina::infra::http::{AdminServices, HttpState, build_router};

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "s3cret";

const EPOCH: OffsetDateTime = datetime!(2025-01-01 00:00 UTC);

#[derive(Default)]
struct Tables {
    clock: i64,
    categories: Vec<CategoryRecord>,
    products: Vec<ProductRecord>,
    images: Vec<ProductImageRecord>,
    announcements: Vec<AnnouncementRecord>,
    slides: Vec<HeroSlideRecord>,
    posts: Vec<BlogPostRecord>,
    contacts: Vec<ContactSubmissionRecord>,
    settings: BTreeMap<String, SiteSettingRecord>,
}

impl Tables {
    /// Strictly increasing timestamps so ordering by creation time is deterministic.
    fn tick(&mut self) -> OffsetDateTime {
        self.clock += 1;
        EPOCH + time::Duration::seconds(self.clock)
    }

    fn category(&self, id: Uuid) -> Result<CategoryRecord, RepoError> {
        self.categories
            .iter()
            .find(|category| category.id == id)
            .cloned()
            .ok_or_else(|| RepoError::InvalidInput {
                message: format!("category {id} does not exist"),
            })
    }

    fn detail(&self, product: &ProductRecord) -> Result<ProductDetail, RepoError> {
        let mut images: Vec<_> = self
            .images
            .iter()
            .filter(|image| image.product_id == product.id)
            .cloned()
            .collect();
        images.sort_by(|a, b| {
            a.sequence
                .cmp(&b.sequence)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(ProductDetail {
            product: product.clone(),
            category: self.category(product.category_id)?,
            images,
        })
    }

    fn replace_images(&mut self, product_id: Uuid, params: &ProductParams) {
        let Some(images) = &params.images else {
            return;
        };
        self.images.retain(|image| image.product_id != product_id);
        for image in images {
            let created_at = self.tick();
            self.images.push(ProductImageRecord {
                id: Uuid::new_v4(),
                product_id,
                url: image.url.clone(),
                alt_text: image.alt_text.clone(),
                sequence: image.sequence,
                is_active: image.is_active,
                created_at,
            });
        }
    }
}

/// Settings write failure injected into the next batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFault {
    /// The write of the entry at this index fails.
    FailAt(usize),
    /// The batch stalls longer than any budget.
    Stall,
}

/// One store implementing every repository trait.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    settings_fault: StdMutex<Option<SettingsFault>>,
    offline: StdMutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inject_settings_fault(&self, fault: SettingsFault) {
        *self.settings_fault.lock().expect("fault lock") = Some(fault);
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().expect("offline lock") = offline;
    }

    pub async fn settings_snapshot(&self) -> BTreeMap<String, String> {
        self.tables
            .lock()
            .await
            .settings
            .values()
            .map(|setting| (setting.key.clone(), setting.value.clone()))
            .collect()
    }

    pub async fn image_count(&self) -> usize {
        self.tables.lock().await.images.len()
    }

    fn ensure_online(&self) -> Result<(), RepoError> {
        if *self.offline.lock().expect("offline lock") {
            Err(RepoError::Unavailable("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ProductsRepo for MemoryStore {
    async fn list_listings(&self) -> Result<Vec<ProductListing>, RepoError> {
        self.ensure_online()?;
        let tables = self.tables.lock().await;
        let mut listings = tables
            .products
            .iter()
            .map(|product| {
                Ok(ProductListing {
                    product: product.clone(),
                    category: tables.category(product.category_id)?,
                })
            })
            .collect::<Result<Vec<_>, RepoError>>()?;
        listings.sort_by(|a, b| b.product.created_at.cmp(&a.product.created_at));
        Ok(listings)
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<ProductDetail>, RepoError> {
        self.ensure_online()?;
        let tables = self.tables.lock().await;
        tables
            .products
            .iter()
            .find(|product| product.id == id)
            .map(|product| tables.detail(product))
            .transpose()
    }

    async fn create_product(&self, params: ProductParams) -> Result<ProductDetail, RepoError> {
        let mut tables = self.tables.lock().await;
        tables.category(params.category_id)?;
        let at = tables.tick();
        let product = ProductRecord {
            id: Uuid::new_v4(),
            title: params.title.clone(),
            original_price: params.original_price,
            sale_price: params.sale_price,
            status: params.status,
            is_active: params.is_active,
            is_featured: params.is_featured,
            image: params.image.clone(),
            badge: params.badge.clone(),
            description: params.description.clone(),
            category_id: params.category_id,
            created_at: at,
            updated_at: at,
        };
        tables.replace_images(product.id, &params);
        tables.products.push(product.clone());
        tables.detail(&product)
    }

    async fn update_product(
        &self,
        id: Uuid,
        params: ProductParams,
    ) -> Result<ProductDetail, RepoError> {
        let mut tables = self.tables.lock().await;
        tables.category(params.category_id)?;
        let at = tables.tick();
        let product = tables
            .products
            .iter_mut()
            .find(|product| product.id == id)
            .ok_or(RepoError::NotFound)?;
        product.title = params.title.clone();
        product.original_price = params.original_price;
        product.sale_price = params.sale_price;
        product.status = params.status;
        product.is_active = params.is_active;
        product.is_featured = params.is_featured;
        product.image = params.image.clone();
        product.badge = params.badge.clone();
        product.description = params.description.clone();
        product.category_id = params.category_id;
        product.updated_at = at;
        let product = product.clone();
        tables.replace_images(id, &params);
        tables.detail(&product)
    }

    async fn delete_product(&self, id: Uuid) -> Result<ProductDetail, RepoError> {
        let mut tables = self.tables.lock().await;
        let position = tables
            .products
            .iter()
            .position(|product| product.id == id)
            .ok_or(RepoError::NotFound)?;
        let detail = tables.detail(&tables.products[position])?;
        tables.images.retain(|image| image.product_id != id);
        tables.products.remove(position);
        Ok(detail)
    }

    async fn count_products(&self) -> Result<ProductCounts, RepoError> {
        let tables = self.tables.lock().await;
        Ok(ProductCounts {
            total: tables.products.len() as u64,
            active: tables.products.iter().filter(|p| p.is_active).count() as u64,
        })
    }
}

#[async_trait]
impl CategoriesRepo for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<CategorySummary>, RepoError> {
        self.ensure_online()?;
        let tables = self.tables.lock().await;
        let mut summaries: Vec<_> = tables
            .categories
            .iter()
            .map(|category| CategorySummary {
                category: category.clone(),
                product_count: tables
                    .products
                    .iter()
                    .filter(|p| p.category_id == category.id && p.is_active)
                    .count() as u64,
            })
            .collect();
        summaries.sort_by(|a, b| a.category.name.cmp(&b.category.name));
        Ok(summaries)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<CategoryRecord>, RepoError> {
        self.ensure_online()?;
        let tables = self.tables.lock().await;
        Ok(tables.categories.iter().find(|c| c.slug == slug).cloned())
    }

    async fn create_category(&self, params: CategoryParams) -> Result<CategoryRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        if tables.categories.iter().any(|c| c.slug == params.slug) {
            return Err(RepoError::Duplicate {
                constraint: "categories_slug_key".into(),
            });
        }
        let at = tables.tick();
        let record = CategoryRecord {
            id: Uuid::new_v4(),
            name: params.name,
            slug: params.slug,
            description: params.description,
            created_at: at,
            updated_at: at,
        };
        tables.categories.push(record.clone());
        Ok(record)
    }

    async fn update_category(
        &self,
        id: Uuid,
        params: CategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let at = tables.tick();
        let record = tables
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepoError::NotFound)?;
        record.name = params.name;
        record.slug = params.slug;
        record.description = params.description;
        record.updated_at = at;
        Ok(record.clone())
    }

    async fn delete_category(&self, id: Uuid) -> Result<CategoryRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let position = tables
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or(RepoError::NotFound)?;
        Ok(tables.categories.remove(position))
    }

    async fn count_products_in(&self, id: Uuid) -> Result<u64, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.products.iter().filter(|p| p.category_id == id).count() as u64)
    }

    async fn count_categories(&self) -> Result<u64, RepoError> {
        Ok(self.tables.lock().await.categories.len() as u64)
    }
}

#[async_trait]
impl AnnouncementsRepo for MemoryStore {
    async fn list_announcements(&self) -> Result<Vec<AnnouncementRecord>, RepoError> {
        self.ensure_online()?;
        let mut all = self.tables.lock().await.announcements.clone();
        all.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(all)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AnnouncementRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.announcements.iter().find(|a| a.id == id).cloned())
    }

    async fn create_announcement(
        &self,
        params: AnnouncementParams,
    ) -> Result<AnnouncementRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let at = tables.tick();
        let record = announcement_record(Uuid::new_v4(), params, at, at);
        tables.announcements.push(record.clone());
        Ok(record)
    }

    async fn update_announcement(
        &self,
        id: Uuid,
        params: AnnouncementParams,
    ) -> Result<AnnouncementRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let at = tables.tick();
        let slot = tables
            .announcements
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(RepoError::NotFound)?;
        *slot = announcement_record(id, params, slot.created_at, at);
        Ok(slot.clone())
    }

    async fn delete_announcement(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.lock().await;
        let before = tables.announcements.len();
        tables.announcements.retain(|a| a.id != id);
        if tables.announcements.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn count_announcements(&self) -> Result<u64, RepoError> {
        Ok(self.tables.lock().await.announcements.len() as u64)
    }
}

fn announcement_record(
    id: Uuid,
    params: AnnouncementParams,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
) -> AnnouncementRecord {
    AnnouncementRecord {
        id,
        title: params.title,
        message: params.message,
        kind: params.kind,
        status: params.status,
        is_visible: params.is_visible,
        priority: params.priority,
        background_color: params.background_color,
        text_color: params.text_color,
        is_scrolling: params.is_scrolling,
        show_close_button: params.show_close_button,
        auto_hide: params.auto_hide,
        auto_hide_delay: params.auto_hide_delay,
        start_date: params.start_date,
        end_date: params.end_date,
        link_url: params.link_url,
        link_text: params.link_text,
        created_at,
        updated_at,
    }
}

#[async_trait]
impl CarouselRepo for MemoryStore {
    async fn list_slides(&self) -> Result<Vec<HeroSlideRecord>, RepoError> {
        self.ensure_online()?;
        let mut slides = self.tables.lock().await.slides.clone();
        slides.sort_by(|a, b| {
            a.sequence
                .cmp(&b.sequence)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(slides)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<HeroSlideRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.slides.iter().find(|s| s.id == id).cloned())
    }

    async fn create_slide(&self, params: CreateSlideParams) -> Result<HeroSlideRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let sequence = params.sequence.unwrap_or_else(|| {
            tables.slides.iter().map(|s| s.sequence).max().unwrap_or(0) + 1
        });
        let at = tables.tick();
        let record = HeroSlideRecord {
            id: Uuid::new_v4(),
            name: params.name,
            image_url: params.image_url,
            sequence,
            is_active: params.is_active,
            created_at: at,
            updated_at: at,
        };
        tables.slides.push(record.clone());
        Ok(record)
    }

    async fn update_slide(
        &self,
        id: Uuid,
        params: UpdateSlideParams,
    ) -> Result<HeroSlideRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let at = tables.tick();
        let slide = tables
            .slides
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(RepoError::NotFound)?;
        slide.name = params.name;
        slide.image_url = params.image_url;
        slide.sequence = params.sequence;
        slide.is_active = params.is_active;
        slide.updated_at = at;
        Ok(slide.clone())
    }

    async fn delete_slide(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.lock().await;
        let before = tables.slides.len();
        tables.slides.retain(|s| s.id != id);
        if tables.slides.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn count_slides(&self) -> Result<u64, RepoError> {
        Ok(self.tables.lock().await.slides.len() as u64)
    }
}

#[async_trait]
impl BlogRepo for MemoryStore {
    async fn list_posts(&self) -> Result<Vec<BlogPostRecord>, RepoError> {
        self.ensure_online()?;
        let mut posts = self.tables.lock().await.posts.clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<BlogPostRecord>, RepoError> {
        self.ensure_online()?;
        let tables = self.tables.lock().await;
        Ok(tables.posts.iter().find(|p| p.slug == slug).cloned())
    }

    async fn create_post(&self, params: BlogPostParams) -> Result<BlogPostRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        if tables.posts.iter().any(|p| p.slug == params.slug) {
            return Err(RepoError::Duplicate {
                constraint: "blog_posts_slug_key".into(),
            });
        }
        let at = tables.tick();
        let record = post_record(Uuid::new_v4(), params, at, at);
        tables.posts.push(record.clone());
        Ok(record)
    }

    async fn update_post(
        &self,
        id: Uuid,
        params: BlogPostParams,
    ) -> Result<BlogPostRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let at = tables.tick();
        let slot = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;
        *slot = post_record(id, params, slot.created_at, at);
        Ok(slot.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<BlogPostRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let position = tables
            .posts
            .iter()
            .position(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;
        Ok(tables.posts.remove(position))
    }

    async fn count_posts(&self) -> Result<BlogCounts, RepoError> {
        let tables = self.tables.lock().await;
        Ok(BlogCounts {
            total: tables.posts.len() as u64,
            published: tables.posts.iter().filter(|p| p.is_published).count() as u64,
        })
    }
}

fn post_record(
    id: Uuid,
    params: BlogPostParams,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
) -> BlogPostRecord {
    BlogPostRecord {
        id,
        title: params.title,
        slug: params.slug,
        content: params.content,
        excerpt: params.excerpt,
        featured_image: params.featured_image,
        is_published: params.is_published,
        published_at: params.published_at,
        meta_title: params.meta_title,
        meta_description: params.meta_description,
        tags: params.tags,
        author_name: params.author_name,
        author_email: params.author_email,
        created_at,
        updated_at,
    }
}

#[async_trait]
impl ContactRepo for MemoryStore {
    async fn create_submission(
        &self,
        submission: NewContactSubmission,
    ) -> Result<ContactSubmissionRecord, RepoError> {
        self.ensure_online()?;
        let mut tables = self.tables.lock().await;
        let created_at = tables.tick();
        let record = ContactSubmissionRecord {
            id: Uuid::new_v4(),
            name: submission.name,
            email: submission.email,
            phone: submission.phone,
            subject: submission.subject,
            message: submission.message,
            created_at,
        };
        tables.contacts.push(record.clone());
        Ok(record)
    }

    async fn list_submissions(&self) -> Result<Vec<ContactSubmissionRecord>, RepoError> {
        let mut all = self.tables.lock().await.contacts.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContactSubmissionRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.contacts.iter().find(|c| c.id == id).cloned())
    }

    async fn count_submissions(&self) -> Result<u64, RepoError> {
        Ok(self.tables.lock().await.contacts.len() as u64)
    }
}

#[async_trait]
impl SettingsRepo for MemoryStore {
    async fn list_settings(&self) -> Result<Vec<SiteSettingRecord>, RepoError> {
        self.ensure_online()?;
        let mut all: Vec<_> = self.tables.lock().await.settings.values().cloned().collect();
        all.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.key.cmp(&b.key)));
        Ok(all)
    }

    async fn upsert_batch(
        &self,
        entries: Vec<SettingUpsert>,
        budget: Duration,
    ) -> Result<Vec<SiteSettingRecord>, RepoError> {
        let fault = self.settings_fault.lock().expect("fault lock").take();
        if fault == Some(SettingsFault::Stall) {
            tokio::time::sleep(budget).await;
            return Err(RepoError::Timeout);
        }

        let mut tables = self.tables.lock().await;
        let mut staged = tables.settings.clone();
        let mut written = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            if fault == Some(SettingsFault::FailAt(index)) {
                return Err(RepoError::Persistence(format!(
                    "write of `{}` failed",
                    entry.key
                )));
            }
            let updated_at = tables.tick();
            let record = match staged.get(&entry.key) {
                Some(current) => SiteSettingRecord {
                    key: entry.key.clone(),
                    value: entry.value,
                    description: entry.description.or_else(|| current.description.clone()),
                    category: entry.category.unwrap_or_else(|| current.category.clone()),
                    setting_type: entry
                        .setting_type
                        .unwrap_or_else(|| current.setting_type.clone()),
                    updated_at,
                },
                None => SiteSettingRecord {
                    key: entry.key.clone(),
                    value: entry.value,
                    description: entry.description,
                    category: entry.category.unwrap_or_else(|| "general".into()),
                    setting_type: entry.setting_type.unwrap_or_else(|| "string".into()),
                    updated_at,
                },
            };
            staged.insert(entry.key, record.clone());
            written.push(record);
        }
        tables.settings = staged;
        Ok(written)
    }

    async fn insert_missing(&self, entries: Vec<SettingUpsert>) -> Result<u64, RepoError> {
        let mut tables = self.tables.lock().await;
        let mut created = 0;
        for entry in entries {
            if tables.settings.contains_key(&entry.key) {
                continue;
            }
            let updated_at = tables.tick();
            tables.settings.insert(
                entry.key.clone(),
                SiteSettingRecord {
                    key: entry.key,
                    value: entry.value,
                    description: entry.description,
                    category: entry.category.unwrap_or_else(|| "general".into()),
                    setting_type: entry.setting_type.unwrap_or_else(|| "string".into()),
                    updated_at,
                },
            );
            created += 1;
        }
        Ok(created)
    }
}

#[async_trait]
impl HealthRepo for MemoryStore {
    async fn ping(&self) -> Result<(), RepoError> {
        self.ensure_online()
    }
}

/// Records every revalidation request it receives.
#[derive(Default)]
pub struct RecordingRevalidator {
    calls: StdMutex<Vec<Vec<String>>>,
    fail: bool,
}

impl RecordingRevalidator {
    pub fn failing() -> Self {
        Self {
            calls: StdMutex::default(),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl Revalidator for RecordingRevalidator {
    async fn revalidate(&self, paths: &[String]) -> Result<(), RevalidationError> {
        self.calls.lock().expect("calls lock").push(paths.to_vec());
        if self.fail {
            Err(RevalidationError::Rejected { status: 500 })
        } else {
            Ok(())
        }
    }
}

/// Deterministic signer producing URLs under a fake bucket host.
pub struct FakeSigner;

impl UploadSigner for FakeSigner {
    fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires: Duration,
        _now: OffsetDateTime,
    ) -> Result<PresignedUpload, SignerError> {
        Ok(PresignedUpload {
            upload_url: format!(
                "https://bucket.test/{key}?X-Amz-Expires={}&content-type={content_type}",
                expires.as_secs()
            ),
            public_url: format!("https://cdn.test/{key}"),
        })
    }
}

pub struct TestAppBuilder {
    store: Arc<MemoryStore>,
    credentials: Option<Credentials>,
    protect_admin: bool,
    signer: bool,
    revalidator: Arc<RecordingRevalidator>,
    settings_budget: Duration,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            credentials: Credentials::from_parts(
                Some(ADMIN_USER.into()),
                Some(ADMIN_PASSWORD.into()),
            ),
            protect_admin: true,
            signer: true,
            revalidator: Arc::new(RecordingRevalidator::default()),
            settings_budget: Duration::from_secs(30),
        }
    }

    pub fn without_credentials(mut self) -> Self {
        self.credentials = None;
        self
    }

    pub fn unprotected(mut self) -> Self {
        self.protect_admin = false;
        self
    }

    pub fn without_signer(mut self) -> Self {
        self.signer = false;
        self
    }

    pub fn revalidator(mut self, revalidator: RecordingRevalidator) -> Self {
        self.revalidator = Arc::new(revalidator);
        self
    }

    pub fn settings_budget(mut self, budget: Duration) -> Self {
        self.settings_budget = budget;
        self
    }

    pub fn build(self) -> TestApp {
        let store = self.store;
        let products: Arc<dyn ProductsRepo> = store.clone();
        let categories: Arc<dyn CategoriesRepo> = store.clone();
        let announcements: Arc<dyn AnnouncementsRepo> = store.clone();
        let carousel: Arc<dyn CarouselRepo> = store.clone();
        let blog: Arc<dyn BlogRepo> = store.clone();
        let settings: Arc<dyn SettingsRepo> = store.clone();
        let contact: Arc<dyn ContactRepo> = store.clone();
        let health: Arc<dyn HealthRepo> = store.clone();

        let cache_config = CacheConfig {
            auto_consume_interval_ms: 0,
            ..CacheConfig::default()
        };
        let response_store = Arc::new(ResponseStore::new(&cache_config));
        let queue = Arc::new(EventQueue::new());
        let revalidator: Arc<dyn Revalidator> = self.revalidator.clone();
        let consumer = Arc::new(CacheConsumer::new(
            cache_config.clone(),
            response_store.clone(),
            queue.clone(),
            Some(revalidator),
        ));
        let trigger = Arc::new(CacheTrigger::new(queue, consumer));
        let shared = Some(trigger.clone());

        let signer = self
            .signer
            .then(|| Arc::new(FakeSigner) as Arc<dyn UploadSigner>);

        let admin = AdminServices {
            products: Arc::new(
                AdminProductService::new(products.clone(), categories.clone())
                    .with_cache_trigger_opt(shared.clone()),
            ),
            categories: Arc::new(
                AdminCategoryService::new(categories.clone())
                    .with_cache_trigger_opt(shared.clone()),
            ),
            announcements: Arc::new(
                AdminAnnouncementService::new(announcements.clone())
                    .with_cache_trigger_opt(shared.clone()),
            ),
            carousel: Arc::new(
                AdminCarouselService::new(carousel.clone()).with_cache_trigger_opt(shared.clone()),
            ),
            blog: Arc::new(AdminBlogService::new(blog.clone()).with_cache_trigger_opt(shared.clone())),
            settings: Arc::new(
                AdminSettingsService::new(settings.clone(), self.settings_budget)
                    .with_cache_trigger_opt(shared),
            ),
            dashboard: Arc::new(AdminDashboardService::new(
                products.clone(),
                categories.clone(),
                blog.clone(),
                announcements.clone(),
                carousel.clone(),
                contact.clone(),
            )),
            auth: Arc::new(AdminAuthService::new(self.credentials)),
            uploads: Arc::new(AdminUploadService::new(signer, Duration::from_secs(3600))),
        };

        let state = HttpState {
            storefront: Arc::new(StorefrontService::new(StorefrontRepos {
                products,
                categories,
                announcements,
                carousel,
                blog,
                settings,
                health,
            })),
            contact: Arc::new(ContactService::new(contact)),
            admin,
            cache: CacheState {
                config: cache_config,
                store: response_store.clone(),
            },
            cache_trigger: trigger.clone(),
            protect_admin: self.protect_admin,
        };

        TestApp {
            router: build_router(state),
            store,
            responses: response_store,
            revalidator: self.revalidator,
            trigger,
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub responses: Arc<ResponseStore>,
    pub revalidator: Arc<RecordingRevalidator>,
    pub trigger: Arc<CacheTrigger>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        TestAppBuilder::new().build()
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).expect("request"))
            .await
    }

    pub async fn admin(&self, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
        let token = STANDARD.encode(format!("{ADMIN_USER}:{ADMIN_PASSWORD}"));
        self.request(method, uri, body, Some(format!("Basic {token}")))
            .await
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        authorization: Option<String>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        into_test_response(response).await
    }

    /// Seeds a category through the admin API and returns its id.
    pub async fn seed_category(&self, name: &str, slug: &str) -> Uuid {
        let response = self
            .admin(
                "POST",
                "/api/admin/categories",
                Some(serde_json::json!({ "name": name, "slug": slug })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        id_of(&response.body)
    }

    /// Lets spawned revalidation tasks run to completion.
    pub async fn settle(&self) {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }
}

pub fn id_of(body: &Value) -> Uuid {
    body["id"]
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok())
        .expect("response carries an id")
}

async fn into_test_response(response: Response<Body>) -> TestResponse {
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    TestResponse {
        status,
        headers,
        body,
    }
}
