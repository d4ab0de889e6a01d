//! Domain entities mirrored from persistent storage.
//!
//! Records serialize with camelCase keys and RFC 3339 timestamps; they are the
//! shape returned by the admin surface.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::money::Money;
use crate::domain::types::{AnnouncementKind, AnnouncementStatus, ProductStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: Uuid,
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
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImageRecord {
    pub id: Uuid,
    pub product_id: Uuid,
    pub url: String,
    pub alt_text: Option<String>,
    pub sequence: i32,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A product joined with the category it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    #[serde(flatten)]
    pub product: ProductRecord,
    pub category: CategoryRecord,
}

/// Full product aggregate returned by single-record reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: ProductRecord,
    pub category: CategoryRecord,
    pub images: Vec<ProductImageRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementRecord {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
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
    #[serde(with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl AnnouncementRecord {
    /// Whether the announcement should be shown to visitors at `now`.
    pub fn is_live_at(&self, now: OffsetDateTime) -> bool {
        self.is_visible
            && self.status == AnnouncementStatus::Active
            && self.start_date.is_none_or(|start| start <= now)
            && self.end_date.is_none_or(|end| end >= now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroSlideRecord {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub sequence: i32,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostRecord {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub is_published: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub tags: Vec<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmissionRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettingRecord {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub category: String,
    #[serde(rename = "type")]
    pub setting_type: String,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn announcement() -> AnnouncementRecord {
        let at = datetime!(2025-03-01 12:00 UTC);
        AnnouncementRecord {
            id: Uuid::nil(),
            title: "Spring sale".into(),
            message: "Twenty percent off".into(),
            kind: AnnouncementKind::Promotion,
            status: AnnouncementStatus::Active,
            is_visible: true,
            priority: 1,
            background_color: "#000000".into(),
            text_color: "#ffffff".into(),
            is_scrolling: true,
            show_close_button: true,
            auto_hide: false,
            auto_hide_delay: 5000,
            start_date: None,
            end_date: None,
            link_url: None,
            link_text: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn live_window_is_inclusive_and_open_ended() {
        let now = datetime!(2025-03-10 00:00 UTC);
        let mut record = announcement();
        assert!(record.is_live_at(now));

        record.start_date = Some(now);
        record.end_date = Some(now);
        assert!(record.is_live_at(now));

        record.start_date = Some(datetime!(2025-03-11 00:00 UTC));
        assert!(!record.is_live_at(now));

        record.start_date = None;
        record.end_date = Some(datetime!(2025-03-09 23:59 UTC));
        assert!(!record.is_live_at(now));
    }

    #[test]
    fn hidden_or_inactive_announcements_are_not_live() {
        let now = datetime!(2025-03-10 00:00 UTC);
        let mut record = announcement();
        record.is_visible = false;
        assert!(!record.is_live_at(now));

        let mut record = announcement();
        record.status = AnnouncementStatus::Scheduled;
        assert!(!record.is_live_at(now));
    }

    #[test]
    fn announcement_serializes_kind_as_type() {
        let json = serde_json::to_value(announcement()).expect("serialize");
        assert_eq!(json["type"], "PROMOTION");
        assert_eq!(json["backgroundColor"], "#000000");
        assert_eq!(json["createdAt"], "2025-03-01T12:00:00Z");
        assert!(json["startDate"].is_null());
    }
}
