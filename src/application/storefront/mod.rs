//! Public read facade.
//!
//! Loads persisted rows, applies the ordering and filtering rules and maps the
//! result into the shapes in [`views`].

mod views;

pub use views::{
    AnnouncementView, BlogPostSummaryView, BlogPostView, CarouselSlideView, CategoryPageView,
    CategoryView, ProductDetailView, ProductImageView, ProductView,
};

use std::collections::BTreeMap;
use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::application::repos::{
    AnnouncementsRepo, BlogRepo, CarouselRepo, CategoriesRepo, HealthRepo, ProductsRepo,
    SettingsRepo,
};
use crate::domain::entities::ProductListing;
use crate::domain::ordering::{
    active_carousel, product_gallery, public_products, published_posts, visible_announcements,
};

/// Store handles used by the public surface.
#[derive(Clone)]
pub struct StorefrontRepos {
    pub products: Arc<dyn ProductsRepo>,
    pub categories: Arc<dyn CategoriesRepo>,
    pub announcements: Arc<dyn AnnouncementsRepo>,
    pub carousel: Arc<dyn CarouselRepo>,
    pub blog: Arc<dyn BlogRepo>,
    pub settings: Arc<dyn SettingsRepo>,
    pub health: Arc<dyn HealthRepo>,
}

#[derive(Clone)]
pub struct StorefrontService {
    repos: StorefrontRepos,
}

impl StorefrontService {
    pub fn new(repos: StorefrontRepos) -> Self {
        Self { repos }
    }

    pub async fn announcements(&self) -> Result<Vec<AnnouncementView>, ServiceError> {
        self.announcements_at(OffsetDateTime::now_utc()).await
    }

    pub async fn announcements_at(
        &self,
        now: OffsetDateTime,
    ) -> Result<Vec<AnnouncementView>, ServiceError> {
        let all = self
            .repos
            .announcements
            .list_announcements()
            .await
            .map_err(ServiceError::repo("Failed to fetch announcements"))?;
        Ok(visible_announcements(all, now)
            .into_iter()
            .map(AnnouncementView::from)
            .collect())
    }

    pub async fn products(
        &self,
        category_slug: Option<&str>,
    ) -> Result<Vec<ProductView>, ServiceError> {
        let all = self
            .repos
            .products
            .list_listings()
            .await
            .map_err(ServiceError::repo("Failed to fetch products"))?;
        Ok(public_products(all, category_slug)
            .into_iter()
            .map(ProductView::from)
            .collect())
    }

    /// One active product with its ordered gallery.
    pub async fn product(&self, id: Uuid) -> Result<ProductDetailView, ServiceError> {
        let detail = self
            .repos
            .products
            .find_detail(id)
            .await
            .map_err(ServiceError::repo("Failed to fetch product"))?
            .filter(|detail| detail.product.is_active)
            .ok_or_else(|| ServiceError::not_found("product"))?;

        let images = product_gallery(detail.images)
            .into_iter()
            .map(ProductImageView::from)
            .collect();
        let listing = ProductListing {
            product: detail.product,
            category: detail.category,
        };
        Ok(ProductDetailView {
            product: ProductView::from(listing),
            images,
        })
    }

    pub async fn categories(&self) -> Result<Vec<CategoryView>, ServiceError> {
        let categories = self
            .repos
            .categories
            .list_categories()
            .await
            .map_err(ServiceError::repo("Failed to fetch categories"))?;
        Ok(categories.into_iter().map(CategoryView::from).collect())
    }

    pub async fn category(&self, slug: &str) -> Result<CategoryPageView, ServiceError> {
        let category = self
            .repos
            .categories
            .find_by_slug(slug)
            .await
            .map_err(ServiceError::repo("Failed to fetch category"))?
            .ok_or_else(|| ServiceError::not_found("category"))?;
        let products = self.products(Some(&category.slug)).await?;
        Ok(CategoryPageView {
            category: CategoryView {
                product_count: Some(products.len() as u64),
                ..CategoryView::from(category)
            },
            products,
        })
    }

    pub async fn carousel(&self) -> Result<Vec<CarouselSlideView>, ServiceError> {
        let slides = self
            .repos
            .carousel
            .list_slides()
            .await
            .map_err(ServiceError::repo("Failed to fetch hero carousel"))?;
        Ok(active_carousel(slides)
            .into_iter()
            .map(CarouselSlideView::from)
            .collect())
    }

    pub async fn blog(&self, limit: Option<usize>) -> Result<Vec<BlogPostSummaryView>, ServiceError> {
        let posts = self
            .repos
            .blog
            .list_posts()
            .await
            .map_err(ServiceError::repo("Failed to fetch blog posts"))?;
        Ok(published_posts(posts, limit)
            .into_iter()
            .map(BlogPostSummaryView::from)
            .collect())
    }

    pub async fn blog_post(&self, slug: &str) -> Result<BlogPostView, ServiceError> {
        self.repos
            .blog
            .find_by_slug(slug)
            .await
            .map_err(ServiceError::repo("Failed to fetch blog post"))?
            .filter(|post| post.is_published)
            .map(BlogPostView::from)
            .ok_or_else(|| ServiceError::not_found("blog post"))
    }

    /// All settings as a flat key/value map.
    pub async fn settings(&self) -> Result<BTreeMap<String, String>, ServiceError> {
        let settings = self
            .repos
            .settings
            .list_settings()
            .await
            .map_err(ServiceError::repo("Failed to fetch settings"))?;
        Ok(settings
            .into_iter()
            .map(|setting| (setting.key, setting.value))
            .collect())
    }

    pub async fn database_health(&self) -> Result<(), ServiceError> {
        self.repos
            .health
            .ping()
            .await
            .map_err(ServiceError::repo("Database unavailable"))
    }
}
