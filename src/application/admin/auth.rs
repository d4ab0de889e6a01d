//! Shared-secret admin credential check.

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::application::error::{AuthError, ServiceError};

/// The single admin identity configured at start-up.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Both values must be present and non-empty.
    pub fn from_parts(username: Option<String>, password: Option<String>) -> Option<Self> {
        match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(Self { username, password })
            }
            _ => None,
        }
    }

    fn matches(&self, username: &str, password: &str) -> bool {
        let user_ok = self.username.as_bytes().ct_eq(username.as_bytes());
        let pass_ok = self.password.as_bytes().ct_eq(password.as_bytes());
        (user_ok & pass_ok).into()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginPayload {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    pub success: bool,
}

#[derive(Debug, Clone)]
pub struct AdminAuthService {
    credentials: Option<Credentials>,
}

impl AdminAuthService {
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self { credentials }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Verifies a username/password pair against the configured secrets.
    pub fn verify(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let credentials = self.credentials.as_ref().ok_or(AuthError::NotConfigured)?;
        if credentials.matches(username, password) {
            Ok(())
        } else {
            Err(AuthError::Mismatch)
        }
    }

    pub fn login(&self, payload: LoginPayload) -> Result<LoginOutcome, ServiceError> {
        if !self.is_configured() {
            return Err(AuthError::NotConfigured.into());
        }
        // Absent or blank fields are a failed login, not a malformed request.
        let username = payload.username.as_deref().unwrap_or_default();
        let password = payload.password.as_deref().unwrap_or_default();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::Mismatch.into());
        }
        self.verify(username, password)?;
        Ok(LoginOutcome { success: true })
    }
}
