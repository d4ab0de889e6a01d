//! Storefront surfaces and the paths that render them.
//!
//! A surface owns two path sets: storefront page paths sent to the remote
//! revalidation endpoint, and public API prefixes evicted from the local
//! response cache.

use uuid::Uuid;

use super::events::EventKind;

/// Pages that list products; stale after any product-affecting change.
pub const PRODUCT_PAGE_PATHS: [&str; 4] = ["/", "/demo", "/categories", "/products"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Surface {
    /// Home page, catalogue listing and category index.
    Catalogue,
    ProductDetail(Uuid),
    CategoryPage(String),
    AnnouncementBanner,
    HeroCarousel,
    BlogIndex,
    BlogPost(String),
    SiteSettings,
}

impl Surface {
    /// Surfaces made stale by `kind`.
    pub fn affected_by(kind: &EventKind) -> Vec<Surface> {
        match kind {
            EventKind::ProductChanged { id } => {
                vec![Surface::Catalogue, Surface::ProductDetail(*id)]
            }
            EventKind::CategoryChanged { slug } => {
                vec![Surface::Catalogue, Surface::CategoryPage(slug.clone())]
            }
            EventKind::AnnouncementsChanged => vec![Surface::AnnouncementBanner],
            EventKind::CarouselChanged => vec![Surface::HeroCarousel],
            EventKind::BlogPostChanged { slug } => {
                vec![Surface::BlogIndex, Surface::BlogPost(slug.clone())]
            }
            EventKind::SettingsChanged => vec![Surface::SiteSettings],
            EventKind::FullRefresh => vec![
                Surface::Catalogue,
                Surface::AnnouncementBanner,
                Surface::HeroCarousel,
                Surface::BlogIndex,
                Surface::SiteSettings,
            ],
        }
    }

    pub fn page_paths(&self) -> Vec<String> {
        match self {
            Surface::Catalogue => PRODUCT_PAGE_PATHS.iter().map(|p| p.to_string()).collect(),
            Surface::ProductDetail(id) => vec![format!("/products/{id}")],
            Surface::CategoryPage(slug) => vec![format!("/categories/{slug}")],
            Surface::AnnouncementBanner | Surface::HeroCarousel | Surface::SiteSettings => {
                vec!["/".to_string()]
            }
            Surface::BlogIndex => vec!["/".to_string(), "/blog".to_string()],
            Surface::BlogPost(slug) => vec![format!("/blog/{slug}")],
        }
    }

    pub fn api_prefixes(&self) -> Vec<String> {
        let prefixes: &[&str] = match self {
            Surface::Catalogue => &["/api/products", "/api/categories"],
            Surface::ProductDetail(_) | Surface::CategoryPage(_) => &[],
            Surface::AnnouncementBanner => &["/api/announcements"],
            Surface::HeroCarousel => &["/api/hero-carousel"],
            Surface::BlogIndex | Surface::BlogPost(_) => &["/api/blog"],
            Surface::SiteSettings => &["/api/settings"],
        };
        prefixes.iter().map(|p| p.to_string()).collect()
    }
}
