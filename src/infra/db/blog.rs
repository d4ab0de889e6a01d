use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{BlogCounts, BlogPostParams, BlogRepo, RepoError},
    domain::entities::BlogPostRecord,
};

use super::{PostgresRepositories, map_sqlx_error, util::convert_count};

const POST_COLUMNS: &str = "id, title, slug, content, excerpt, featured_image, is_published, \
    published_at, meta_title, meta_description, tags, author_name, author_email, \
    created_at, updated_at";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    slug: String,
    content: String,
    excerpt: Option<String>,
    featured_image: Option<String>,
    is_published: bool,
    published_at: Option<OffsetDateTime>,
    meta_title: Option<String>,
    meta_description: Option<String>,
    tags: Vec<String>,
    author_name: Option<String>,
    author_email: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<PostRow> for BlogPostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            content: row.content,
            excerpt: row.excerpt,
            featured_image: row.featured_image,
            is_published: row.is_published,
            published_at: row.published_at,
            meta_title: row.meta_title,
            meta_description: row.meta_description,
            tags: row.tags,
            author_name: row.author_name,
            author_email: row.author_email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl BlogRepo for PostgresRepositories {
    async fn list_posts(&self) -> Result<Vec<BlogPostRecord>, RepoError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts ORDER BY created_at DESC, id"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(BlogPostRecord::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(BlogPostRecord::from))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<BlogPostRecord>, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(BlogPostRecord::from))
    }

    async fn create_post(&self, params: BlogPostParams) -> Result<BlogPostRecord, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            INSERT INTO blog_posts (
                id, title, slug, content, excerpt, featured_image, is_published, published_at,
                meta_title, meta_description, tags, author_name, author_email
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&params.title)
        .bind(&params.slug)
        .bind(&params.content)
        .bind(&params.excerpt)
        .bind(&params.featured_image)
        .bind(params.is_published)
        .bind(params.published_at)
        .bind(&params.meta_title)
        .bind(&params.meta_description)
        .bind(&params.tags)
        .bind(&params.author_name)
        .bind(&params.author_email)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_post(
        &self,
        id: Uuid,
        params: BlogPostParams,
    ) -> Result<BlogPostRecord, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            UPDATE blog_posts SET
                title = $2, slug = $3, content = $4, excerpt = $5, featured_image = $6,
                is_published = $7, published_at = $8, meta_title = $9, meta_description = $10,
                tags = $11, author_name = $12, author_email = $13, updated_at = now()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&params.title)
        .bind(&params.slug)
        .bind(&params.content)
        .bind(&params.excerpt)
        .bind(&params.featured_image)
        .bind(params.is_published)
        .bind(params.published_at)
        .bind(&params.meta_title)
        .bind(&params.meta_description)
        .bind(&params.tags)
        .bind(&params.author_name)
        .bind(&params.author_email)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(BlogPostRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_post(&self, id: Uuid) -> Result<BlogPostRecord, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "DELETE FROM blog_posts WHERE id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(BlogPostRecord::from).ok_or(RepoError::NotFound)
    }

    async fn count_posts(&self) -> Result<BlogCounts, RepoError> {
        let (total, published): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_published) FROM blog_posts",
        )
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(BlogCounts {
            total: convert_count(total)?,
            published: convert_count(published)?,
        })
    }
}
