use std::sync::Arc;

use serde::Serialize;

use crate::application::error::ServiceError;
use crate::application::repos::{
    AnnouncementsRepo, BlogRepo, CarouselRepo, CategoriesRepo, ContactRepo, ProductsRepo,
};

const FAILURE_MESSAGE: &str = "Failed to fetch dashboard stats";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub products: u64,
    pub active_products: u64,
    pub categories: u64,
    pub blog_posts: u64,
    pub published_posts: u64,
    pub announcements: u64,
    pub carousel_items: u64,
    pub contact_submissions: u64,
}

#[derive(Clone)]
pub struct AdminDashboardService {
    products: Arc<dyn ProductsRepo>,
    categories: Arc<dyn CategoriesRepo>,
    blog: Arc<dyn BlogRepo>,
    announcements: Arc<dyn AnnouncementsRepo>,
    carousel: Arc<dyn CarouselRepo>,
    contact: Arc<dyn ContactRepo>,
}

impl AdminDashboardService {
    pub fn new(
        products: Arc<dyn ProductsRepo>,
        categories: Arc<dyn CategoriesRepo>,
        blog: Arc<dyn BlogRepo>,
        announcements: Arc<dyn AnnouncementsRepo>,
        carousel: Arc<dyn CarouselRepo>,
        contact: Arc<dyn ContactRepo>,
    ) -> Self {
        Self {
            products,
            categories,
            blog,
            announcements,
            carousel,
            contact,
        }
    }

    /// Independent counts, fetched concurrently.
    pub async fn stats(&self) -> Result<DashboardStats, ServiceError> {
        let (products, categories, blog, announcements, carousel_items, contact_submissions) =
            tokio::try_join!(
                self.products.count_products(),
                self.categories.count_categories(),
                self.blog.count_posts(),
                self.announcements.count_announcements(),
                self.carousel.count_slides(),
                self.contact.count_submissions(),
            )
            .map_err(ServiceError::repo(FAILURE_MESSAGE))?;

        Ok(DashboardStats {
            products: products.total,
            active_products: products.active,
            categories,
            blog_posts: blog.total,
            published_posts: blog.published,
            announcements,
            carousel_items,
            contact_submissions,
        })
    }
}
