//! Public read routes served over the in-memory store.

mod support;

use axum::http::StatusCode;
use serde_json::{Value, json};

use support::{TestApp, id_of};

async fn create_product(app: &TestApp, body: Value) -> Value {
    let response = app.admin("POST", "/api/admin/products", Some(body)).await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    response.body
}

fn titles(body: &Value) -> Vec<&str> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|item| item["title"].as_str().expect("title"))
        .collect()
}

#[tokio::test]
async fn products_list_featured_first_and_hides_inactive() {
    let app = TestApp::new();
    let dresses = app.seed_category("Dresses", "dresses").await;
    let shoes = app.seed_category("Shoes", "shoes").await;

    create_product(
        &app,
        json!({"title": "Linen dress", "salePrice": 89.5, "categoryId": dresses}),
    )
    .await;
    create_product(
        &app,
        json!({"title": "Silk dress", "salePrice": 150, "categoryId": dresses, "isFeatured": true}),
    )
    .await;
    create_product(
        &app,
        json!({"title": "Old boots", "salePrice": 40, "categoryId": shoes, "isActive": false}),
    )
    .await;
    create_product(
        &app,
        json!({"title": "Sneakers", "salePrice": 70, "categoryId": shoes, "status": "SOLD_OUT"}),
    )
    .await;

    let response = app.get("/api/products").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(titles(&response.body), ["Silk dress", "Sneakers", "Linen dress"]);

    let sneakers = &response.body[1];
    assert_eq!(sneakers["status"], "sold_out");
    assert_eq!(sneakers["categorySlug"], "shoes");
    assert_eq!(response.body[2]["status"], "available");
    assert_eq!(response.body[2]["salePrice"].as_f64(), Some(89.5));

    let filtered = app.get("/api/products?category=dresses").await;
    assert_eq!(titles(&filtered.body), ["Silk dress", "Linen dress"]);

    let unknown = app.get("/api/products?category=hats").await;
    assert_eq!(unknown.body, json!([]));
}

#[tokio::test]
async fn product_detail_orders_gallery_and_hides_inactive_products() {
    let app = TestApp::new();
    let category = app.seed_category("Bags", "bags").await;
    let product = create_product(
        &app,
        json!({
            "title": "Tote",
            "salePrice": 45,
            "categoryId": category,
            "images": [
                {"url": "https://cdn.test/c.jpg", "sequence": 3},
                {"url": "https://cdn.test/a.jpg", "sequence": 1},
                {"url": "https://cdn.test/hidden.jpg", "sequence": 0, "isActive": false},
            ]
        }),
    )
    .await;
    let id = id_of(&product);

    let response = app.get(&format!("/api/products/{id}")).await;
    assert_eq!(response.status, StatusCode::OK);
    let urls: Vec<_> = response.body["images"]
        .as_array()
        .expect("images")
        .iter()
        .map(|image| image["url"].as_str().expect("url"))
        .collect();
    assert_eq!(urls, ["https://cdn.test/a.jpg", "https://cdn.test/c.jpg"]);

    let hidden = create_product(
        &app,
        json!({"title": "Draft", "salePrice": 10, "categoryId": category, "isActive": false}),
    )
    .await;
    let response = app
        .get(&format!("/api/products/{}", id_of(&hidden)))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "Product not found");
}

#[tokio::test]
async fn malformed_ids_are_rejected() {
    let app = TestApp::new();
    let response = app.get("/api/products/not-a-uuid").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Invalid id");
}

#[tokio::test]
async fn categories_report_active_product_counts() {
    let app = TestApp::new();
    let rings = app.seed_category("Rings", "rings").await;
    app.seed_category("Anklets", "anklets").await;
    create_product(&app, json!({"title": "Band", "salePrice": 20, "categoryId": rings})).await;
    create_product(
        &app,
        json!({"title": "Hidden", "salePrice": 20, "categoryId": rings, "isActive": false}),
    )
    .await;

    let response = app.get("/api/categories").await;
    assert_eq!(response.status, StatusCode::OK);
    let names: Vec<_> = response.body.as_array().expect("array").iter().map(|c| c["name"].clone()).collect();
    assert_eq!(names, [json!("Anklets"), json!("Rings")]);
    assert_eq!(response.body[1]["productCount"], 1);

    let page = app.get("/api/categories/rings").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body["category"]["slug"], "rings");
    assert_eq!(titles(&page.body["products"]), ["Band"]);

    let missing = app.get("/api/categories/earrings").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"], "Category not found");
}

#[tokio::test]
async fn announcements_are_filtered_and_ranked() {
    let app = TestApp::new();
    for body in [
        json!({"title": "Low", "message": "m", "priority": 1}),
        json!({"title": "High", "message": "m", "priority": 9, "type": "PROMOTION"}),
        json!({"title": "Hidden", "message": "m", "priority": 50, "isVisible": false}),
        json!({"title": "Paused", "message": "m", "priority": 50, "status": "INACTIVE"}),
        json!({"title": "Future", "message": "m", "startDate": "2999-01-01T00:00:00Z"}),
        json!({"title": "Also low", "message": "m", "priority": 1}),
    ] {
        let response = app.admin("POST", "/api/admin/announcements", Some(body)).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    }

    let response = app.get("/api/announcements").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(titles(&response.body), ["High", "Also low", "Low"]);
    assert_eq!(response.body[0]["type"], "PROMOTION");
}

#[tokio::test]
async fn carousel_lists_active_slides_by_sequence() {
    let app = TestApp::new();
    for body in [
        json!({"name": "Third", "imageUrl": "https://cdn.test/3.jpg", "sequence": 3}),
        json!({"name": "First", "imageUrl": "https://cdn.test/1.jpg", "sequence": 1}),
        json!({"name": "Off", "imageUrl": "https://cdn.test/0.jpg", "sequence": 0, "isActive": false}),
    ] {
        let response = app.admin("POST", "/api/admin/hero-carousel", Some(body)).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    }

    let response = app.get("/api/hero-carousel").await;
    let names: Vec<_> = response
        .body
        .as_array()
        .expect("array")
        .iter()
        .map(|slide| slide["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, ["First", "Third"]);
}

#[tokio::test]
async fn blog_serves_published_posts_only() {
    let app = TestApp::new();
    for body in [
        json!({"title": "Older", "slug": "older", "content": "c", "isPublished": true, "publishedAt": "2025-01-05T00:00:00Z"}),
        json!({"title": "Newer", "slug": "newer", "content": "c", "isPublished": true, "publishedAt": "2025-02-05T00:00:00Z"}),
        json!({"title": "Draft", "slug": "draft", "content": "c"}),
    ] {
        let response = app.admin("POST", "/api/admin/blog", Some(body)).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    }

    let response = app.get("/api/blog").await;
    assert_eq!(titles(&response.body), ["Newer", "Older"]);

    let limited = app.get("/api/blog?limit=1").await;
    assert_eq!(titles(&limited.body), ["Newer"]);

    let post = app.get("/api/blog/older").await;
    assert_eq!(post.status, StatusCode::OK);
    assert_eq!(post.body["content"], "c");

    let draft = app.get("/api/blog/draft").await;
    assert_eq!(draft.status, StatusCode::NOT_FOUND);
    assert_eq!(draft.body["error"], "Blog post not found");
}

#[tokio::test]
async fn settings_are_served_as_a_flat_map() {
    let app = TestApp::new();
    let response = app
        .admin(
            "PUT",
            "/api/admin/settings",
            Some(json!({"settings": [
                {"key": "site_name", "value": "Atelier"},
                {"key": "currency", "value": "EUR", "category": "commerce"},
            ]})),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let settings = app.get("/api/settings").await;
    assert_eq!(settings.status, StatusCode::OK);
    assert_eq!(settings.body, json!({"currency": "EUR", "site_name": "Atelier"}));
}

#[tokio::test]
async fn contact_form_validates_and_stores_submissions() {
    let app = TestApp::new();
    let rejected = app
        .request(
            "POST",
            "/api/contact",
            Some(json!({"name": "Ada", "email": "ada@example.com"})),
            None,
        )
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        rejected.body["error"],
        "Name, email, subject, and message are required"
    );

    let accepted = app
        .request(
            "POST",
            "/api/contact",
            Some(json!({
                "name": "Ada",
                "email": "ada@example.com",
                "subject": "Sizing",
                "message": "Does the dress run small?"
            })),
            None,
        )
        .await;
    assert_eq!(accepted.status, StatusCode::OK);
    assert_eq!(accepted.body["success"], true);
    let id = accepted.body["id"].as_str().expect("id").to_string();

    let inbox = app.admin("GET", &format!("/api/admin/contact/{id}"), None).await;
    assert_eq!(inbox.status, StatusCode::OK);
    assert_eq!(inbox.body["subject"], "Sizing");
}

#[tokio::test]
async fn malformed_json_bodies_are_rejected() {
    let app = TestApp::new();
    let request = axum::http::Request::post("/api/contact")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .expect("request");
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Invalid JSON body");
}

#[tokio::test]
async fn database_health_reflects_store_reachability() {
    let app = TestApp::new();
    let healthy = app.get("/_health/db").await;
    assert_eq!(healthy.status, StatusCode::NO_CONTENT);

    app.store.set_offline(true);
    let down = app.get("/_health/db").await;
    assert_eq!(down.status, StatusCode::SERVICE_UNAVAILABLE);

    let products = app.get("/api/products").await;
    assert_eq!(products.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        products.body["error"],
        "Failed to fetch products: database unavailable"
    );
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = TestApp::new();
    let response = app.get("/api/products").await;
    assert!(response.headers.contains_key("x-request-id"));
}
