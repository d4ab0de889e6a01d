use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{AnnouncementParams, AnnouncementsRepo, RepoError},
    domain::{
        entities::AnnouncementRecord,
        types::{AnnouncementKind, AnnouncementStatus},
    },
};

use super::{PostgresRepositories, map_sqlx_error, util::convert_count};

const ANNOUNCEMENT_COLUMNS: &str = "id, title, message, kind, status, is_visible, priority, \
    background_color, text_color, is_scrolling, show_close_button, auto_hide, auto_hide_delay, \
    start_date, end_date, link_url, link_text, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct AnnouncementRow {
    id: Uuid,
    title: String,
    message: String,
    kind: AnnouncementKind,
    status: AnnouncementStatus,
    is_visible: bool,
    priority: i32,
    background_color: String,
    text_color: String,
    is_scrolling: bool,
    show_close_button: bool,
    auto_hide: bool,
    auto_hide_delay: i32,
    start_date: Option<OffsetDateTime>,
    end_date: Option<OffsetDateTime>,
    link_url: Option<String>,
    link_text: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<AnnouncementRow> for AnnouncementRecord {
    fn from(row: AnnouncementRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            message: row.message,
            kind: row.kind,
            status: row.status,
            is_visible: row.is_visible,
            priority: row.priority,
            background_color: row.background_color,
            text_color: row.text_color,
            is_scrolling: row.is_scrolling,
            show_close_button: row.show_close_button,
            auto_hide: row.auto_hide,
            auto_hide_delay: row.auto_hide_delay,
            start_date: row.start_date,
            end_date: row.end_date,
            link_url: row.link_url,
            link_text: row.link_text,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl AnnouncementsRepo for PostgresRepositories {
    async fn list_announcements(&self) -> Result<Vec<AnnouncementRecord>, RepoError> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(&format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements \
             ORDER BY priority DESC, created_at DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(AnnouncementRecord::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AnnouncementRecord>, RepoError> {
        let row = sqlx::query_as::<_, AnnouncementRow>(&format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(AnnouncementRecord::from))
    }

    async fn create_announcement(
        &self,
        params: AnnouncementParams,
    ) -> Result<AnnouncementRecord, RepoError> {
        let row = sqlx::query_as::<_, AnnouncementRow>(&format!(
            r#"
            INSERT INTO announcements (
                id, title, message, kind, status, is_visible, priority, background_color,
                text_color, is_scrolling, show_close_button, auto_hide, auto_hide_delay,
                start_date, end_date, link_url, link_text
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {ANNOUNCEMENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&params.title)
        .bind(&params.message)
        .bind(params.kind)
        .bind(params.status)
        .bind(params.is_visible)
        .bind(params.priority)
        .bind(&params.background_color)
        .bind(&params.text_color)
        .bind(params.is_scrolling)
        .bind(params.show_close_button)
        .bind(params.auto_hide)
        .bind(params.auto_hide_delay)
        .bind(params.start_date)
        .bind(params.end_date)
        .bind(&params.link_url)
        .bind(&params.link_text)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_announcement(
        &self,
        id: Uuid,
        params: AnnouncementParams,
    ) -> Result<AnnouncementRecord, RepoError> {
        let row = sqlx::query_as::<_, AnnouncementRow>(&format!(
            r#"
            UPDATE announcements SET
                title = $2, message = $3, kind = $4, status = $5, is_visible = $6,
                priority = $7, background_color = $8, text_color = $9, is_scrolling = $10,
                show_close_button = $11, auto_hide = $12, auto_hide_delay = $13,
                start_date = $14, end_date = $15, link_url = $16, link_text = $17,
                updated_at = now()
            WHERE id = $1
            RETURNING {ANNOUNCEMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&params.title)
        .bind(&params.message)
        .bind(params.kind)
        .bind(params.status)
        .bind(params.is_visible)
        .bind(params.priority)
        .bind(&params.background_color)
        .bind(&params.text_color)
        .bind(params.is_scrolling)
        .bind(params.show_close_button)
        .bind(params.auto_hide)
        .bind(params.auto_hide_delay)
        .bind(params.start_date)
        .bind(params.end_date)
        .bind(&params.link_url)
        .bind(&params.link_text)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(AnnouncementRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_announcement(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn count_announcements(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM announcements")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        convert_count(count)
    }
}
