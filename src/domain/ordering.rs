//! Ordering and filtering rules for storefront read models.
//!
//! Every function here is pure and uses stable sorts, so records that compare
//! equal keep the order in which the store returned them.

use std::cmp::Ordering;

use time::OffsetDateTime;

use crate::domain::entities::{
    AnnouncementRecord, BlogPostRecord, HeroSlideRecord, ProductImageRecord, ProductListing,
};

/// Live announcements, highest priority first, newest first within a priority.
pub fn visible_announcements(
    all: impl IntoIterator<Item = AnnouncementRecord>,
    now: OffsetDateTime,
) -> Vec<AnnouncementRecord> {
    let mut visible: Vec<_> = all.into_iter().filter(|a| a.is_live_at(now)).collect();
    visible.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    visible
}

/// Active slides by ascending sequence.
pub fn active_carousel(all: impl IntoIterator<Item = HeroSlideRecord>) -> Vec<HeroSlideRecord> {
    let mut slides: Vec<_> = all.into_iter().filter(|slide| slide.is_active).collect();
    slides.sort_by_key(|slide| slide.sequence);
    slides
}

/// Active products, featured first, then newest first.
///
/// When `category_slug` is given only products whose category carries that
/// slug are kept.
pub fn public_products(
    all: impl IntoIterator<Item = ProductListing>,
    category_slug: Option<&str>,
) -> Vec<ProductListing> {
    let mut products: Vec<_> = all
        .into_iter()
        .filter(|listing| listing.product.is_active)
        .filter(|listing| category_slug.is_none_or(|slug| listing.category.slug == slug))
        .collect();
    products.sort_by(|a, b| {
        b.product
            .is_featured
            .cmp(&a.product.is_featured)
            .then_with(|| b.product.created_at.cmp(&a.product.created_at))
    });
    products
}

/// Published posts, most recently published first; undated posts sort last.
pub fn published_posts(
    all: impl IntoIterator<Item = BlogPostRecord>,
    limit: Option<usize>,
) -> Vec<BlogPostRecord> {
    let mut posts: Vec<_> = all.into_iter().filter(|post| post.is_published).collect();
    posts.sort_by(|a, b| newest_first_nulls_last(a.published_at, b.published_at));
    if let Some(limit) = limit {
        posts.truncate(limit);
    }
    posts
}

/// Active images of a product by ascending sequence, then creation time.
pub fn product_gallery(
    images: impl IntoIterator<Item = ProductImageRecord>,
) -> Vec<ProductImageRecord> {
    let mut gallery: Vec<_> = images.into_iter().filter(|image| image.is_active).collect();
    gallery.sort_by(|a, b| {
        a.sequence
            .cmp(&b.sequence)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
    gallery
}

fn newest_first_nulls_last(a: Option<OffsetDateTime>, b: Option<OffsetDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use time::Duration;
    use time::macros::datetime;
    use uuid::Uuid;

    use super::*;
    use crate::domain::entities::{CategoryRecord, ProductRecord};
    use crate::domain::money::Money;
    use crate::domain::types::{AnnouncementKind, AnnouncementStatus, ProductStatus};

    const EPOCH: OffsetDateTime = datetime!(2025-01-01 00:00 UTC);

    fn announcement(title: &str, priority: i32, created_offset_hours: i64) -> AnnouncementRecord {
        let created = EPOCH + Duration::hours(created_offset_hours);
        AnnouncementRecord {
            id: Uuid::new_v4(),
            title: title.into(),
            message: String::new(),
            kind: AnnouncementKind::Info,
            status: AnnouncementStatus::Active,
            is_visible: true,
            priority,
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
            created_at: created,
            updated_at: created,
        }
    }

    fn slide(name: &str, sequence: i32, is_active: bool) -> HeroSlideRecord {
        HeroSlideRecord {
            id: Uuid::new_v4(),
            name: name.into(),
            image_url: format!("https://cdn.test/{name}.jpg"),
            sequence,
            is_active,
            created_at: EPOCH,
            updated_at: EPOCH,
        }
    }

    fn category(slug: &str) -> CategoryRecord {
        CategoryRecord {
            id: Uuid::new_v4(),
            name: slug.to_uppercase(),
            slug: slug.into(),
            description: None,
            created_at: EPOCH,
            updated_at: EPOCH,
        }
    }

    fn listing(title: &str, slug: &str, featured: bool, active: bool, day: i64) -> ProductListing {
        let category = category(slug);
        let created = EPOCH + Duration::days(day);
        ProductListing {
            product: ProductRecord {
                id: Uuid::new_v4(),
                title: title.into(),
                original_price: None,
                sale_price: Money::ZERO,
                status: ProductStatus::Available,
                is_active: active,
                is_featured: featured,
                image: None,
                badge: None,
                description: None,
                category_id: category.id,
                created_at: created,
                updated_at: created,
            },
            category,
        }
    }

    fn post(title: &str, published: bool, published_at: Option<OffsetDateTime>) -> BlogPostRecord {
        BlogPostRecord {
            id: Uuid::new_v4(),
            title: title.into(),
            slug: title.to_lowercase(),
            content: "body".into(),
            excerpt: None,
            featured_image: None,
            is_published: published,
            published_at,
            meta_title: None,
            meta_description: None,
            tags: Vec::new(),
            author_name: None,
            author_email: None,
            created_at: EPOCH,
            updated_at: EPOCH,
        }
    }

    fn titles<T>(items: &[T], title: impl Fn(&T) -> &str) -> Vec<String> {
        items.iter().map(|item| title(item).to_string()).collect()
    }

    #[test]
    fn announcements_sort_by_priority_then_recency() {
        let result = visible_announcements(
            vec![
                announcement("low-old", 1, 0),
                announcement("high", 5, 0),
                announcement("low-new", 1, 10),
            ],
            EPOCH + Duration::days(1),
        );
        assert_eq!(
            titles(&result, |a| &a.title),
            vec!["high", "low-new", "low-old"]
        );
    }

    #[test]
    fn announcements_outside_window_are_dropped() {
        let now = EPOCH + Duration::days(5);
        let mut future = announcement("future", 9, 0);
        future.start_date = Some(now + Duration::minutes(1));
        let mut expired = announcement("expired", 9, 0);
        expired.end_date = Some(now - Duration::minutes(1));
        let mut inactive = announcement("inactive", 9, 0);
        inactive.status = AnnouncementStatus::Inactive;
        let current = announcement("current", 0, 0);

        let result = visible_announcements(vec![future, expired, inactive, current], now);
        assert_eq!(titles(&result, |a| &a.title), vec!["current"]);
    }

    #[test]
    fn announcement_ties_keep_input_order() {
        let result = visible_announcements(
            vec![announcement("a", 2, 3), announcement("b", 2, 3)],
            EPOCH + Duration::days(1),
        );
        assert_eq!(titles(&result, |a| &a.title), vec!["a", "b"]);
    }

    #[test]
    fn carousel_keeps_active_slides_in_sequence_order() {
        let result = active_carousel(vec![
            slide("third", 3, true),
            slide("hidden", 0, false),
            slide("first", 1, true),
            slide("second-a", 2, true),
            slide("second-b", 2, true),
        ]);
        assert_eq!(
            titles(&result, |s| &s.name),
            vec!["first", "second-a", "second-b", "third"]
        );
    }

    #[test]
    fn products_put_featured_first_then_newest() {
        let result = public_products(
            vec![
                listing("old-plain", "shoes", false, true, 1),
                listing("new-plain", "shoes", false, true, 5),
                listing("old-featured", "bags", true, true, 0),
                listing("inactive", "shoes", true, false, 9),
            ],
            None,
        );
        assert_eq!(
            titles(&result, |l| &l.product.title),
            vec!["old-featured", "new-plain", "old-plain"]
        );
    }

    #[test]
    fn products_filter_by_category_slug() {
        let result = public_products(
            vec![
                listing("boot", "shoes", false, true, 1),
                listing("tote", "bags", false, true, 2),
            ],
            Some("bags"),
        );
        assert_eq!(titles(&result, |l| &l.product.title), vec!["tote"]);

        let none = public_products(vec![listing("boot", "shoes", false, true, 1)], Some("hats"));
        assert!(none.is_empty());
    }

    #[test]
    fn posts_order_by_publication_with_undated_last_and_limit() {
        let result = published_posts(
            vec![
                post("undated", true, None),
                post("older", true, Some(EPOCH)),
                post("draft", false, Some(EPOCH + Duration::days(9))),
                post("newer", true, Some(EPOCH + Duration::days(2))),
            ],
            None,
        );
        assert_eq!(
            titles(&result, |p| &p.title),
            vec!["newer", "older", "undated"]
        );

        let limited = published_posts(
            vec![
                post("older", true, Some(EPOCH)),
                post("newer", true, Some(EPOCH + Duration::days(2))),
            ],
            Some(1),
        );
        assert_eq!(titles(&limited, |p| &p.title), vec!["newer"]);
    }

    #[test]
    fn limit_zero_yields_empty_list() {
        let result = published_posts(vec![post("one", true, Some(EPOCH))], Some(0));
        assert!(result.is_empty());
    }

    #[test]
    fn gallery_orders_by_sequence_then_creation() {
        let product_id = Uuid::new_v4();
        let image = |url: &str, sequence: i32, minutes: i64, active: bool| ProductImageRecord {
            id: Uuid::new_v4(),
            product_id,
            url: url.into(),
            alt_text: None,
            sequence,
            is_active: active,
            created_at: EPOCH + Duration::minutes(minutes),
        };
        let result = product_gallery(vec![
            image("late", 1, 5, true),
            image("early", 1, 1, true),
            image("zero", 0, 9, true),
            image("off", 0, 0, false),
        ]);
        assert_eq!(
            titles(&result, |i| &i.url),
            vec!["zero", "early", "late"]
        );
    }
}
