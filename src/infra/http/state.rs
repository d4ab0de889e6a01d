use std::sync::Arc;

use crate::application::admin::{
    announcements::AdminAnnouncementService, auth::AdminAuthService, blog::AdminBlogService,
    carousel::AdminCarouselService, categories::AdminCategoryService,
    dashboard::AdminDashboardService, products::AdminProductService,
    settings::AdminSettingsService, uploads::AdminUploadService,
};
use crate::application::contact::ContactService;
use crate::application::storefront::StorefrontService;
use crate::cache::{CacheState, CacheTrigger};

/// Back-office services behind `/api/admin`.
#[derive(Clone)]
pub struct AdminServices {
    pub products: Arc<AdminProductService>,
    pub categories: Arc<AdminCategoryService>,
    pub announcements: Arc<AdminAnnouncementService>,
    pub carousel: Arc<AdminCarouselService>,
    pub blog: Arc<AdminBlogService>,
    pub settings: Arc<AdminSettingsService>,
    pub dashboard: Arc<AdminDashboardService>,
    pub auth: Arc<AdminAuthService>,
    pub uploads: Arc<AdminUploadService>,
}

#[derive(Clone)]
pub struct HttpState {
    pub storefront: Arc<StorefrontService>,
    pub contact: Arc<ContactService>,
    pub admin: AdminServices,
    pub cache: CacheState,
    pub cache_trigger: Arc<CacheTrigger>,
    /// Require HTTP Basic credentials on admin routes.
    pub protect_admin: bool,
}
