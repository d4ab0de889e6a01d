use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{CategoriesRepo, CategoryParams, CategorySummary, RepoError},
    domain::entities::CategoryRecord,
};

use super::{PostgresRepositories, map_sqlx_error, util::convert_count};

const CATEGORY_COLUMNS: &str = "id, name, slug, description, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    slug: String,
    description: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<CategoryRow> for CategoryRecord {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    #[sqlx(flatten)]
    category: CategoryRow,
    product_count: i64,
}

#[async_trait]
impl CategoriesRepo for PostgresRepositories {
    async fn list_categories(&self) -> Result<Vec<CategorySummary>, RepoError> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT c.id, c.name, c.slug, c.description, c.created_at, c.updated_at,
                   COUNT(p.id) FILTER (WHERE p.is_active) AS product_count
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            GROUP BY c.id
            ORDER BY c.name ASC, c.slug ASC
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(CategorySummary {
                    category: row.category.into(),
                    product_count: convert_count(row.product_count)?,
                })
            })
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(CategoryRecord::from))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<CategoryRecord>, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(CategoryRecord::from))
    }

    async fn create_category(&self, params: CategoryParams) -> Result<CategoryRecord, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "INSERT INTO categories (id, name, slug, description) VALUES ($1, $2, $3, $4) \
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&params.name)
        .bind(&params.slug)
        .bind(&params.description)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_category(
        &self,
        id: Uuid,
        params: CategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "UPDATE categories SET name = $2, slug = $3, description = $4, updated_at = now() \
             WHERE id = $1 RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .bind(&params.name)
        .bind(&params.slug)
        .bind(&params.description)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(CategoryRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_category(&self, id: Uuid) -> Result<CategoryRecord, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "DELETE FROM categories WHERE id = $1 RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(CategoryRecord::from).ok_or(RepoError::NotFound)
    }

    async fn count_products_in(&self, id: Uuid) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = $1")
            .bind(id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        convert_count(count)
    }

    async fn count_categories(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        convert_count(count)
    }
}
