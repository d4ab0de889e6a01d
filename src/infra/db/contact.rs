use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{ContactRepo, NewContactSubmission, RepoError},
    domain::entities::ContactSubmissionRecord,
};

use super::{PostgresRepositories, map_sqlx_error, util::convert_count};

const SUBMISSION_COLUMNS: &str = "id, name, email, phone, subject, message, created_at";

#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    subject: String,
    message: String,
    created_at: OffsetDateTime,
}

impl From<SubmissionRow> for ContactSubmissionRecord {
    fn from(row: SubmissionRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            subject: row.subject,
            message: row.message,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ContactRepo for PostgresRepositories {
    async fn create_submission(
        &self,
        submission: NewContactSubmission,
    ) -> Result<ContactSubmissionRecord, RepoError> {
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            "INSERT INTO contact_submissions (id, name, email, phone, subject, message) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(&submission.phone)
        .bind(&submission.subject)
        .bind(&submission.message)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn list_submissions(&self) -> Result<Vec<ContactSubmissionRecord>, RepoError> {
        let rows = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM contact_submissions ORDER BY created_at DESC, id"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ContactSubmissionRecord::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContactSubmissionRecord>, RepoError> {
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM contact_submissions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ContactSubmissionRecord::from))
    }

    async fn count_submissions(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contact_submissions")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        convert_count(count)
    }
}
