use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{CarouselRepo, CreateSlideParams, RepoError, UpdateSlideParams},
    domain::entities::HeroSlideRecord,
};

use super::{PostgresRepositories, map_sqlx_error, util::convert_count};

const SLIDE_COLUMNS: &str = "id, name, image_url, sequence, is_active, created_at, updated_at";

/// Serialises concurrent appends that compute `max(sequence) + 1`.
const SEQUENCE_LOCK_KEY: i64 = 0x7665_7472_696e_6101;

#[derive(sqlx::FromRow)]
struct SlideRow {
    id: Uuid,
    name: String,
    image_url: String,
    sequence: i32,
    is_active: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<SlideRow> for HeroSlideRecord {
    fn from(row: SlideRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            image_url: row.image_url,
            sequence: row.sequence,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CarouselRepo for PostgresRepositories {
    async fn list_slides(&self) -> Result<Vec<HeroSlideRecord>, RepoError> {
        let rows = sqlx::query_as::<_, SlideRow>(&format!(
            "SELECT {SLIDE_COLUMNS} FROM hero_carousel ORDER BY sequence ASC, created_at ASC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(HeroSlideRecord::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<HeroSlideRecord>, RepoError> {
        let row = sqlx::query_as::<_, SlideRow>(&format!(
            "SELECT {SLIDE_COLUMNS} FROM hero_carousel WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(HeroSlideRecord::from))
    }

    async fn create_slide(&self, params: CreateSlideParams) -> Result<HeroSlideRecord, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let sequence = match params.sequence {
            Some(sequence) => sequence,
            None => {
                sqlx::query("SELECT pg_advisory_xact_lock($1)")
                    .bind(SEQUENCE_LOCK_KEY)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_sqlx_error)?;

                sqlx::query_scalar::<_, i32>(
                    "SELECT COALESCE(MAX(sequence), 0) + 1 FROM hero_carousel",
                )
                .fetch_one(&mut *tx)
                .await
                .map_err(map_sqlx_error)?
            }
        };

        let row = sqlx::query_as::<_, SlideRow>(&format!(
            "INSERT INTO hero_carousel (id, name, image_url, sequence, is_active) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {SLIDE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&params.name)
        .bind(&params.image_url)
        .bind(sequence)
        .bind(params.is_active)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(row.into())
    }

    async fn update_slide(
        &self,
        id: Uuid,
        params: UpdateSlideParams,
    ) -> Result<HeroSlideRecord, RepoError> {
        let row = sqlx::query_as::<_, SlideRow>(&format!(
            "UPDATE hero_carousel SET name = $2, image_url = $3, sequence = $4, is_active = $5, \
             updated_at = now() WHERE id = $1 RETURNING {SLIDE_COLUMNS}"
        ))
        .bind(id)
        .bind(&params.name)
        .bind(&params.image_url)
        .bind(params.sequence)
        .bind(params.is_active)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(HeroSlideRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_slide(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM hero_carousel WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn count_slides(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM hero_carousel")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        convert_count(count)
    }
}
