//! HTTP client for the storefront's on-demand revalidation endpoint.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::cache::{RevalidationError, Revalidator};
use crate::config::RevalidationSettings;

use super::error::InfraError;

#[derive(Serialize)]
struct RevalidateBody<'a> {
    paths: &'a [String],
}

/// Posts `{ "paths": [...] }` to the configured endpoint with the shared
/// secret as a bearer token.
#[derive(Clone)]
pub struct HttpRevalidator {
    client: reqwest::Client,
    endpoint: Url,
    secret: Option<String>,
}

impl HttpRevalidator {
    pub fn new(endpoint: Url, secret: Option<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint,
            secret,
        }
    }

    /// `None` when no endpoint is configured.
    pub fn from_settings(settings: &RevalidationSettings) -> Result<Option<Self>, InfraError> {
        let Some(endpoint) = settings.endpoint.clone() else {
            return Ok(None);
        };
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|err| InfraError::HttpClient(err.to_string()))?;
        Ok(Some(Self::new(endpoint, settings.secret.clone(), client)))
    }
}

#[async_trait]
impl Revalidator for HttpRevalidator {
    async fn revalidate(&self, paths: &[String]) -> Result<(), RevalidationError> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&RevalidateBody { paths });
        if let Some(secret) = self.secret.as_deref() {
            request = request.bearer_auth(secret);
        }

        let response = request
            .send()
            .await
            .map_err(|err| RevalidationError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RevalidationError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!(
            target = "vetrina::infra::revalidation",
            endpoint = %self.endpoint,
            paths = paths.len(),
            "storefront revalidation accepted"
        );
        Ok(())
    }
}
