//! AWS Signature V4 query-string pre-signing for S3-compatible stores.

use std::time::Duration;

use hmac::{Hmac, Mac, digest::KeyInit};
use sha2::{Digest, Sha256};
use time::{OffsetDateTime, macros::format_description};
use url::Url;

use crate::application::admin::uploads::{PresignedUpload, SignerError, UploadSigner};
use crate::config::StorageSettings;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";
const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct S3Presigner {
    endpoint: Url,
    bucket: String,
    region: String,
    access_key_id: String,
    secret_access_key: String,
    public_base_url: Option<Url>,
    path_style: bool,
}

impl std::fmt::Debug for S3Presigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Presigner")
            .field("endpoint", &self.endpoint.as_str())
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("path_style", &self.path_style)
            .finish_non_exhaustive()
    }
}

impl S3Presigner {
    /// Builds a signer when bucket and both keys are configured.
    pub fn from_settings(settings: &StorageSettings) -> Option<Self> {
        let bucket = settings.bucket.clone()?;
        let access_key_id = settings.access_key_id.clone()?;
        let secret_access_key = settings.secret_access_key.clone()?;

        let endpoint = match settings.endpoint.clone() {
            Some(endpoint) => endpoint,
            None => Url::parse(&format!("https://s3.{}.amazonaws.com", settings.region)).ok()?,
        };

        Some(Self {
            endpoint,
            bucket,
            region: settings.region.clone(),
            access_key_id,
            secret_access_key,
            public_base_url: settings.public_base_url.clone(),
            path_style: settings.path_style,
        })
    }

    fn host(&self) -> Result<String, SignerError> {
        let host = self
            .endpoint
            .host_str()
            .ok_or_else(|| SignerError::Configuration("endpoint has no host".into()))?;
        let host = match self.endpoint.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        Ok(if self.path_style {
            host
        } else {
            format!("{}.{host}", self.bucket)
        })
    }

    fn canonical_path(&self, key: &str) -> String {
        let key = uri_encode(key, false);
        if self.path_style {
            format!("/{}/{key}", uri_encode(&self.bucket, true))
        } else {
            format!("/{key}")
        }
    }

    /// Signs `host`, plus `content-type` when given; the uploader must send
    /// exactly that header.
    fn presign(
        &self,
        method: &str,
        key: &str,
        content_type: Option<&str>,
        expires: Duration,
        now: OffsetDateTime,
    ) -> Result<String, SignerError> {
        if key.is_empty() || key.starts_with('/') {
            return Err(SignerError::InvalidKey(key.to_string()));
        }

        let host = self.host()?;
        let path = self.canonical_path(key);
        let now = now.to_offset(time::UtcOffset::UTC);
        let amz_date = now
            .format(format_description!(
                "[year][month][day]T[hour][minute][second]Z"
            ))
            .map_err(|err| SignerError::Configuration(err.to_string()))?;
        let date = &amz_date[..8];
        let scope = format!("{date}/{}/{SERVICE}/aws4_request", self.region);
        let credential = format!("{}/{scope}", self.access_key_id);

        let (canonical_headers, signed_headers) = match content_type {
            Some(content_type) => (
                format!("content-type:{}\nhost:{host}\n", content_type.trim()),
                "content-type;host",
            ),
            None => (format!("host:{host}\n"), "host"),
        };

        // Already in canonical (sorted) order.
        let query = [
            ("X-Amz-Algorithm", ALGORITHM.to_string()),
            ("X-Amz-Credential", credential),
            ("X-Amz-Date", amz_date.clone()),
            ("X-Amz-Expires", expires.as_secs().to_string()),
            ("X-Amz-SignedHeaders", signed_headers.to_string()),
        ]
        .iter()
        .map(|(name, value)| format!("{name}={}", uri_encode(value, true)))
        .collect::<Vec<_>>()
        .join("&");

        let canonical_request = format!(
            "{method}\n{path}\n{query}\n{canonical_headers}\n{signed_headers}\n{UNSIGNED_PAYLOAD}"
        );
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()).as_slice())
        );

        let mut signing_key = hmac_sha256(
            format!("AWS4{}", self.secret_access_key).as_bytes(),
            date.as_bytes(),
        )?;
        for part in [self.region.as_str(), SERVICE, "aws4_request"] {
            signing_key = hmac_sha256(&signing_key, part.as_bytes())?;
        }
        let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

        Ok(format!(
            "{}://{host}{path}?{query}&X-Amz-Signature={signature}",
            self.endpoint.scheme()
        ))
    }

    fn public_url(&self, key: &str) -> Result<String, SignerError> {
        match self.public_base_url.as_ref() {
            Some(base) => Ok(format!(
                "{}/{}",
                base.as_str().trim_end_matches('/'),
                uri_encode(key, false)
            )),
            None => Ok(format!(
                "{}://{}{}",
                self.endpoint.scheme(),
                self.host()?,
                self.canonical_path(key)
            )),
        }
    }
}

impl UploadSigner for S3Presigner {
    fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires: Duration,
        now: OffsetDateTime,
    ) -> Result<PresignedUpload, SignerError> {
        Ok(PresignedUpload {
            upload_url: self.presign("PUT", key, Some(content_type), expires, now)?,
            public_url: self.public_url(key)?,
        })
    }
}

/// RFC 3986 unreserved characters pass through; everything else is %XX.
fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b'/' if !encode_slash => out.push('/'),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<Vec<u8>, SignerError> {
    let mut mac = <HmacSha256 as KeyInit>::new_from_slice(key)
        .map_err(|err| SignerError::Configuration(format!("signing key rejected: {err}")))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}
