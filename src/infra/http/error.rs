//! JSON error responses and extractors that reject with them.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::application::error::{AuthError, ErrorReport, ServiceError};
use crate::application::repos::RepoError;

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    error: String,
}

/// `{ "error": "..." }` with a status in {400, 401, 404, 500, 503}.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    report: ErrorReport,
}

impl ApiError {
    pub fn new(source: &'static str, status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status,
            report: ErrorReport::from_message(source, status, message.clone()),
            message,
        }
    }

    pub fn bad_request(source: &'static str, message: impl Into<String>) -> Self {
        Self::new(source, StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(source: &'static str) -> Self {
        Self::new(source, StatusCode::UNAUTHORIZED, "Invalid credentials")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Translates a service failure, keeping the full chain for the log only.
    pub fn from_service(source: &'static str, err: ServiceError) -> Self {
        let (status, message) = match &err {
            ServiceError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ServiceError::Auth(AuthError::Mismatch) => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            ServiceError::Auth(AuthError::NotConfigured) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Admin credentials not configured".to_string(),
            ),
            ServiceError::NotFound { entity } => {
                (StatusCode::NOT_FOUND, format!("{} not found", capitalise(entity)))
            }
            ServiceError::Repo { action, source } => repo_status(action, source),
            ServiceError::Upstream { action, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, (*action).to_string())
            }
        };

        Self {
            status,
            report: ErrorReport::from_error(source, status, &err),
            message,
        }
    }
}

fn repo_status(action: &str, err: &RepoError) -> (StatusCode, String) {
    match err {
        RepoError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
        RepoError::Timeout => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("{action}: database timed out"),
        ),
        RepoError::Unavailable(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("{action}: database unavailable"),
        ),
        RepoError::Duplicate { .. } => (
            StatusCode::BAD_REQUEST,
            format!("{action}: a record with the same unique value exists"),
        ),
        RepoError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, format!("{action}: invalid input"))
        }
        RepoError::Integrity { .. } | RepoError::Persistence(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, action.to_string())
        }
    }
}

fn capitalise(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self::from_service("infra::http", err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let mut error = Self::bad_request("infra::http::json", "Invalid JSON body");
        error.report = ErrorReport::from_error(
            "infra::http::json",
            StatusCode::BAD_REQUEST,
            &rejection,
        );
        error
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        let mut error = Self::bad_request("infra::http::path", "Invalid id");
        error.report = ErrorReport::from_error(
            "infra::http::path",
            StatusCode::BAD_REQUEST,
            &rejection,
        );
        error
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        let mut error = Self::bad_request("infra::http::query", "Invalid query string");
        error.report = ErrorReport::from_error(
            "infra::http::query",
            StatusCode::BAD_REQUEST,
            &rejection,
        );
        error
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (
            self.status,
            Json(ApiErrorBody {
                error: self.message,
            }),
        )
            .into_response();
        self.report.attach(&mut response);
        response
    }
}

/// `axum::Json` whose rejection renders as [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// `axum::extract::Path` whose rejection renders as [`ApiError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);

/// `axum::extract::Query` whose rejection renders as [`ApiError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_of(error: ApiError) -> (StatusCode, serde_json::Value, Option<ErrorReport>) {
        let response = error.into_response();
        let status = response.status();
        let report = response.extensions().get::<ErrorReport>().cloned();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        (
            status,
            serde_json::from_slice(&bytes).expect("json"),
            report,
        )
    }

    #[tokio::test]
    async fn validation_renders_message_verbatim() {
        let (status, body, _) = body_of(ServiceError::validation("Title is required").into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": "Title is required" }));
    }

    #[tokio::test]
    async fn unreachable_store_maps_to_service_unavailable() {
        let err = ServiceError::repo("Failed to update settings")(RepoError::Unavailable(
            "connection refused".into(),
        ));
        let (status, body, report) = body_of(err.into()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Failed to update settings: database unavailable");
        let report = report.expect("report attached");
        assert!(report.messages.iter().any(|m| m.contains("connection refused")));
    }

    #[tokio::test]
    async fn generic_store_failure_hides_detail() {
        let err = ServiceError::repo("Failed to create product")(RepoError::from_persistence(
            "relation products does not exist",
        ));
        let (status, body, _) = body_of(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to create product");
    }

    #[tokio::test]
    async fn auth_errors_split_between_401_and_500() {
        let (status, _, _) = body_of(ServiceError::from(AuthError::Mismatch).into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _, _) = body_of(ServiceError::from(AuthError::NotConfigured).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn not_found_names_the_entity() {
        let (status, body, _) = body_of(ServiceError::not_found("blog post").into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Blog post not found");
    }
}
