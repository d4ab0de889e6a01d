use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::Response;
use thiserror::Error;

use crate::application::repos::RepoError;
use crate::domain::error::DomainError;
use crate::infra::error::InfraError;

/// Diagnostic chain attached to error responses for the logging middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    Mismatch,
    #[error("admin credentials are not configured")]
    NotConfigured,
}

/// Failure of an application service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller input was missing or malformed; the message is shown verbatim.
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    /// Store failure; `action` is the caller-facing description.
    #[error("{action}")]
    Repo {
        action: &'static str,
        #[source]
        source: RepoError,
    },
    #[error("{action}: {message}")]
    Upstream {
        action: &'static str,
        message: String,
    },
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn upstream(action: &'static str, message: impl Into<String>) -> Self {
        Self::Upstream {
            action,
            message: message.into(),
        }
    }

    /// Returns a mapper that tags a store failure with a caller-facing action.
    pub fn repo(action: &'static str) -> impl FnOnce(RepoError) -> ServiceError {
        move |source| ServiceError::Repo { action, source }
    }
}

impl From<DomainError> for ServiceError {
    fn from(error: DomainError) -> Self {
        ServiceError::Validation(error.to_string())
    }
}

/// Failure surfaced by the binary entry point.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
