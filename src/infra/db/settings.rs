use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgConnection;
use time::OffsetDateTime;
use tracing::warn;

use crate::{
    application::repos::{RepoError, SettingUpsert, SettingsRepo},
    domain::entities::SiteSettingRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

const SETTING_COLUMNS: &str = "key, value, description, category, setting_type, updated_at";

#[derive(sqlx::FromRow)]
struct SettingRow {
    key: String,
    value: String,
    description: Option<String>,
    category: String,
    setting_type: String,
    updated_at: OffsetDateTime,
}

impl From<SettingRow> for SiteSettingRecord {
    fn from(row: SettingRow) -> Self {
        Self {
            key: row.key,
            value: row.value,
            description: row.description,
            category: row.category,
            setting_type: row.setting_type,
            updated_at: row.updated_at,
        }
    }
}

async fn upsert_one(
    conn: &mut PgConnection,
    entry: &SettingUpsert,
) -> Result<SiteSettingRecord, RepoError> {
    let row = sqlx::query_as::<_, SettingRow>(&format!(
        r#"
        INSERT INTO site_settings (key, value, description, category, setting_type)
        VALUES ($1, $2, $3, COALESCE($4, 'general'), COALESCE($5, 'string'))
        ON CONFLICT (key) DO UPDATE SET
            value = EXCLUDED.value,
            description = COALESCE($3, site_settings.description),
            category = COALESCE($4, site_settings.category),
            setting_type = COALESCE($5, site_settings.setting_type),
            updated_at = now()
        RETURNING {SETTING_COLUMNS}
        "#
    ))
    .bind(&entry.key)
    .bind(&entry.value)
    .bind(&entry.description)
    .bind(&entry.category)
    .bind(&entry.setting_type)
    .fetch_one(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    Ok(row.into())
}

#[async_trait]
impl SettingsRepo for PostgresRepositories {
    async fn list_settings(&self) -> Result<Vec<SiteSettingRecord>, RepoError> {
        let rows = sqlx::query_as::<_, SettingRow>(&format!(
            "SELECT {SETTING_COLUMNS} FROM site_settings ORDER BY category ASC, key ASC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(SiteSettingRecord::from).collect())
    }

    async fn upsert_batch(
        &self,
        entries: Vec<SettingUpsert>,
        budget: Duration,
    ) -> Result<Vec<SiteSettingRecord>, RepoError> {
        let batch = async {
            let mut tx = self.begin().await.map_err(map_sqlx_error)?;

            // SET does not accept bind parameters.
            sqlx::query(&format!(
                "SET LOCAL statement_timeout = {}",
                budget.as_millis().max(1)
            ))
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

            let mut records = Vec::with_capacity(entries.len());
            for entry in &entries {
                records.push(upsert_one(&mut tx, entry).await?);
            }

            tx.commit().await.map_err(map_sqlx_error)?;
            Ok::<_, RepoError>(records)
        };

        match tokio::time::timeout(budget, batch).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    target = "vetrina::infra::db::settings",
                    budget_ms = budget.as_millis() as u64,
                    entries = entries.len(),
                    "settings batch exceeded its budget; transaction dropped"
                );
                Err(RepoError::Timeout)
            }
        }
    }

    async fn insert_missing(&self, entries: Vec<SettingUpsert>) -> Result<u64, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;
        let mut created = 0;

        for entry in &entries {
            let result = sqlx::query(
                r#"
                INSERT INTO site_settings (key, value, description, category, setting_type)
                VALUES ($1, $2, $3, COALESCE($4, 'general'), COALESCE($5, 'string'))
                ON CONFLICT (key) DO NOTHING
                "#,
            )
            .bind(&entry.key)
            .bind(&entry.value)
            .bind(&entry.description)
            .bind(&entry.category)
            .bind(&entry.setting_type)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
            created += result.rows_affected();
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(created)
    }
}
