use async_trait::async_trait;

use crate::application::repos::{HealthRepo, RepoError};

use super::{PostgresRepositories, map_sqlx_error};

#[async_trait]
impl HealthRepo for PostgresRepositories {
    async fn ping(&self) -> Result<(), RepoError> {
        self.health_check().await.map_err(map_sqlx_error)
    }
}
