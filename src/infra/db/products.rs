use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{
        ProductCounts, ProductImageParams, ProductParams, ProductsRepo, RepoError,
    },
    domain::{
        entities::{CategoryRecord, ProductDetail, ProductImageRecord, ProductListing, ProductRecord},
        money::Money,
        types::ProductStatus,
    },
};

use super::{PostgresRepositories, map_sqlx_error, util::convert_count};

const LISTING_SELECT: &str = r#"
    SELECT p.id, p.title, p.original_price, p.sale_price, p.status, p.is_active,
           p.is_featured, p.image, p.badge, p.description, p.category_id,
           p.created_at, p.updated_at,
           c.name AS category_name, c.slug AS category_slug,
           c.description AS category_description,
           c.created_at AS category_created_at, c.updated_at AS category_updated_at
    FROM products p
    INNER JOIN categories c ON c.id = p.category_id
"#;

#[derive(sqlx::FromRow)]
struct ListingRow {
    id: Uuid,
    title: String,
    original_price: Option<Decimal>,
    sale_price: Decimal,
    status: ProductStatus,
    is_active: bool,
    is_featured: bool,
    image: Option<String>,
    badge: Option<String>,
    description: Option<String>,
    category_id: Uuid,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    category_name: String,
    category_slug: String,
    category_description: Option<String>,
    category_created_at: OffsetDateTime,
    category_updated_at: OffsetDateTime,
}

impl TryFrom<ListingRow> for ProductListing {
    type Error = RepoError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let stored = |amount: Decimal, field: &'static str| {
            Money::new(amount, field).map_err(|err| RepoError::integrity(err.to_string()))
        };

        Ok(Self {
            product: ProductRecord {
                id: row.id,
                title: row.title,
                original_price: row
                    .original_price
                    .map(|amount| stored(amount, "originalPrice"))
                    .transpose()?,
                sale_price: stored(row.sale_price, "salePrice")?,
                status: row.status,
                is_active: row.is_active,
                is_featured: row.is_featured,
                image: row.image,
                badge: row.badge,
                description: row.description,
                category_id: row.category_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            category: CategoryRecord {
                id: row.category_id,
                name: row.category_name,
                slug: row.category_slug,
                description: row.category_description,
                created_at: row.category_created_at,
                updated_at: row.category_updated_at,
            },
        })
    }
}

#[derive(sqlx::FromRow)]
struct ImageRow {
    id: Uuid,
    product_id: Uuid,
    url: String,
    alt_text: Option<String>,
    sequence: i32,
    is_active: bool,
    created_at: OffsetDateTime,
}

impl From<ImageRow> for ProductImageRecord {
    fn from(row: ImageRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            url: row.url,
            alt_text: row.alt_text,
            sequence: row.sequence,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

async fn fetch_detail(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<ProductDetail>, RepoError> {
    let row = sqlx::query_as::<_, ListingRow>(&format!("{LISTING_SELECT} WHERE p.id = $1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

    let Some(row) = row else {
        return Ok(None);
    };
    let listing = ProductListing::try_from(row)?;

    let images = sqlx::query_as::<_, ImageRow>(
        r#"
        SELECT id, product_id, url, alt_text, sequence, is_active, created_at
        FROM product_images
        WHERE product_id = $1
        ORDER BY sequence ASC, created_at ASC
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    Ok(Some(ProductDetail {
        product: listing.product,
        category: listing.category,
        images: images.into_iter().map(ProductImageRecord::from).collect(),
    }))
}

async fn replace_images(
    conn: &mut PgConnection,
    product_id: Uuid,
    images: &[ProductImageParams],
) -> Result<(), RepoError> {
    sqlx::query("DELETE FROM product_images WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

    for image in images {
        sqlx::query(
            r#"
            INSERT INTO product_images (id, product_id, url, alt_text, sequence, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product_id)
        .bind(&image.url)
        .bind(&image.alt_text)
        .bind(image.sequence)
        .bind(image.is_active)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    }

    Ok(())
}

#[async_trait]
impl ProductsRepo for PostgresRepositories {
    async fn list_listings(&self) -> Result<Vec<ProductListing>, RepoError> {
        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            "{LISTING_SELECT} ORDER BY p.created_at DESC, p.id"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(ProductListing::try_from).collect()
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<ProductDetail>, RepoError> {
        let mut conn = self.pool().acquire().await.map_err(map_sqlx_error)?;
        fetch_detail(&mut conn, id).await
    }

    async fn create_product(&self, params: ProductParams) -> Result<ProductDetail, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO products (
                id, title, original_price, sale_price, status, is_active, is_featured,
                image, badge, description, category_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(id)
        .bind(&params.title)
        .bind(params.original_price.map(Money::amount))
        .bind(params.sale_price.amount())
        .bind(params.status)
        .bind(params.is_active)
        .bind(params.is_featured)
        .bind(&params.image)
        .bind(&params.badge)
        .bind(&params.description)
        .bind(params.category_id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if let Some(images) = params.images.as_deref() {
            replace_images(&mut tx, id, images).await?;
        }

        let detail = fetch_detail(&mut tx, id)
            .await?
            .ok_or_else(|| RepoError::integrity("inserted product not visible"))?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(detail)
    }

    async fn update_product(
        &self,
        id: Uuid,
        params: ProductParams,
    ) -> Result<ProductDetail, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let updated = sqlx::query(
            r#"
            UPDATE products SET
                title = $2,
                original_price = $3,
                sale_price = $4,
                status = $5,
                is_active = $6,
                is_featured = $7,
                image = $8,
                badge = $9,
                description = $10,
                category_id = $11,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&params.title)
        .bind(params.original_price.map(Money::amount))
        .bind(params.sale_price.amount())
        .bind(params.status)
        .bind(params.is_active)
        .bind(params.is_featured)
        .bind(&params.image)
        .bind(&params.badge)
        .bind(&params.description)
        .bind(params.category_id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if updated.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        if let Some(images) = params.images.as_deref() {
            replace_images(&mut tx, id, images).await?;
        }

        let detail = fetch_detail(&mut tx, id).await?.ok_or(RepoError::NotFound)?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(detail)
    }

    async fn delete_product(&self, id: Uuid) -> Result<ProductDetail, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let detail = fetch_detail(&mut tx, id).await?.ok_or(RepoError::NotFound)?;

        sqlx::query("DELETE FROM product_images WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(detail)
    }

    async fn count_products(&self) -> Result<ProductCounts, RepoError> {
        let (total, active): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active) FROM products",
        )
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(ProductCounts {
            total: convert_count(total)?,
            active: convert_count(active)?,
        })
    }
}
