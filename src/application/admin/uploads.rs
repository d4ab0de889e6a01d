//! Pre-signed object-store write URLs for admin uploads.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;

use crate::application::error::ServiceError;
use crate::application::validation::require;
use crate::domain::types::UploadKind;

const UPSTREAM_FAILURE: &str = "Failed to generate upload URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedUpload {
    pub upload_url: String,
    pub public_url: String,
}

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("invalid object key `{0}`")]
    InvalidKey(String),
    #[error("signer misconfigured: {0}")]
    Configuration(String),
}

/// Issues time-limited write URLs for an object store.
pub trait UploadSigner: Send + Sync {
    fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires: Duration,
        now: OffsetDateTime,
    ) -> Result<PresignedUpload, SignerError>;
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPayload {
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub upload_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    pub upload_url: String,
    pub public_url: String,
    pub key: String,
    /// `Content-Type` the upload must be sent with.
    pub content_type: String,
    pub expires_in: u64,
}

#[derive(Clone)]
pub struct AdminUploadService {
    signer: Option<Arc<dyn UploadSigner>>,
    ttl: Duration,
}

impl AdminUploadService {
    pub fn new(signer: Option<Arc<dyn UploadSigner>>, ttl: Duration) -> Self {
        Self { signer, ttl }
    }

    pub fn issue(&self, payload: UploadPayload) -> Result<UploadTicket, ServiceError> {
        self.issue_at(payload, OffsetDateTime::now_utc())
    }

    pub fn issue_at(
        &self,
        payload: UploadPayload,
        now: OffsetDateTime,
    ) -> Result<UploadTicket, ServiceError> {
        require(&[
            ("file name", payload.file_name.as_deref()),
            ("file type", payload.file_type.as_deref()),
            ("upload type", payload.upload_type.as_deref()),
        ])?;
        let kind = UploadKind::try_from(payload.upload_type.as_deref().unwrap_or_default().trim())
            .map_err(|_| ServiceError::validation("Invalid upload type"))?;
        let content_type = media_type(payload.file_type.as_deref().unwrap_or_default())
            .ok_or_else(|| ServiceError::validation("Invalid file type"))?;

        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| ServiceError::upstream(UPSTREAM_FAILURE, "object storage is not configured"))?;

        let key = object_key(kind, payload.file_name.as_deref().unwrap_or_default(), now);
        let presigned = signer
            .presign_put(&key, &content_type, self.ttl, now)
            .map_err(|err| ServiceError::upstream(UPSTREAM_FAILURE, err.to_string()))?;

        info!(
            target = "vetrina::application::admin::uploads",
            key = %key,
            upload_type = kind.as_str(),
            "upload URL issued"
        );
        Ok(UploadTicket {
            upload_url: presigned.upload_url,
            public_url: presigned.public_url,
            key,
            content_type,
            expires_in: self.ttl.as_secs(),
        })
    }
}

/// Lower-cased `type/subtype`; parameters such as `; charset=` are not accepted.
fn media_type(value: &str) -> Option<String> {
    let value = value.trim().to_ascii_lowercase();
    let (kind, subtype) = value.split_once('/')?;
    let token = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '.'))
    };
    (token(kind) && token(subtype)).then_some(value)
}

/// `<folder>/<unix-millis>-<slugified stem>.<ext>`
fn object_key(kind: UploadKind, file_name: &str, now: OffsetDateTime) -> String {
    let file_name = file_name.trim();
    let (stem, extension) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    };

    let mut stem = slug::slugify(stem);
    if stem.is_empty() {
        stem.push_str("file");
    }
    let extension: String = extension
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();

    let millis = now.unix_timestamp_nanos() / 1_000_000;
    if extension.is_empty() {
        format!("{}/{millis}-{stem}", kind.as_str())
    } else {
        format!("{}/{millis}-{stem}.{extension}", kind.as_str())
    }
}
