//! Wire shapes consumed by the storefront.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::CategorySummary;
use crate::domain::entities::{
    AnnouncementRecord, BlogPostRecord, CategoryRecord, HeroSlideRecord, ProductImageRecord,
    ProductListing,
};
use crate::domain::money::Money;
use crate::domain::types::AnnouncementKind;

/// Flattened product card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: Uuid,
    pub title: String,
    pub original_price: Option<Money>,
    pub sale_price: Money,
    pub status: &'static str,
    pub image: Option<String>,
    pub badge: Option<String>,
    pub description: Option<String>,
    pub category: String,
    pub category_slug: String,
    pub is_featured: bool,
}

impl From<ProductListing> for ProductView {
    fn from(listing: ProductListing) -> Self {
        let ProductListing { product, category } = listing;
        Self {
            id: product.id,
            title: product.title,
            original_price: product.original_price,
            sale_price: product.sale_price,
            status: product.status.public_token(),
            image: product.image,
            badge: product.badge,
            description: product.description,
            category: category.name,
            category_slug: category.slug,
            is_featured: product.is_featured,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImageView {
    pub id: Uuid,
    pub url: String,
    pub alt_text: Option<String>,
    pub sequence: i32,
}

impl From<ProductImageRecord> for ProductImageView {
    fn from(image: ProductImageRecord) -> Self {
        Self {
            id: image.id,
            url: image.url,
            alt_text: image.alt_text,
            sequence: image.sequence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailView {
    #[serde(flatten)]
    pub product: ProductView,
    pub images: Vec<ProductImageView>,
}

/// Banner fields safe to expose publicly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementView {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: AnnouncementKind,
    pub priority: i32,
    pub background_color: String,
    pub text_color: String,
    pub is_scrolling: bool,
    pub show_close_button: bool,
    pub auto_hide: bool,
    pub auto_hide_delay: i32,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
}

impl From<AnnouncementRecord> for AnnouncementView {
    fn from(record: AnnouncementRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            message: record.message,
            kind: record.kind,
            priority: record.priority,
            background_color: record.background_color,
            text_color: record.text_color,
            is_scrolling: record.is_scrolling,
            show_close_button: record.show_close_button,
            auto_hide: record.auto_hide,
            auto_hide_delay: record.auto_hide_delay,
            link_url: record.link_url,
            link_text: record.link_text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselSlideView {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub sequence: i32,
}

impl From<HeroSlideRecord> for CarouselSlideView {
    fn from(slide: HeroSlideRecord) -> Self {
        Self {
            id: slide.id,
            name: slide.name,
            image_url: slide.image_url,
            sequence: slide.sequence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_count: Option<u64>,
}

impl From<CategoryRecord> for CategoryView {
    fn from(category: CategoryRecord) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            product_count: None,
        }
    }
}

impl From<CategorySummary> for CategoryView {
    fn from(summary: CategorySummary) -> Self {
        Self {
            product_count: Some(summary.product_count),
            ..CategoryView::from(summary.category)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPageView {
    pub category: CategoryView,
    pub products: Vec<ProductView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostSummaryView {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    pub tags: Vec<String>,
    pub author_name: Option<String>,
}

impl From<BlogPostRecord> for BlogPostSummaryView {
    fn from(post: BlogPostRecord) -> Self {
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            excerpt: post.excerpt,
            featured_image: post.featured_image,
            published_at: post.published_at,
            tags: post.tags,
            author_name: post.author_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostView {
    #[serde(flatten)]
    pub summary: BlogPostSummaryView,
    pub content: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

impl From<BlogPostRecord> for BlogPostView {
    fn from(mut post: BlogPostRecord) -> Self {
        let content = std::mem::take(&mut post.content);
        let meta_title = post.meta_title.take();
        let meta_description = post.meta_description.take();
        Self {
            summary: BlogPostSummaryView::from(post),
            content,
            meta_title,
            meta_description,
        }
    }
}
