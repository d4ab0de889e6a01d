use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RevalidationError {
    #[error("revalidation request failed: {0}")]
    Transport(String),
    #[error("revalidation endpoint answered with status {status}")]
    Rejected { status: u16 },
}

/// Notifies the storefront rendering layer that page paths are stale.
#[async_trait]
pub trait Revalidator: Send + Sync {
    async fn revalidate(&self, paths: &[String]) -> Result<(), RevalidationError>;
}
