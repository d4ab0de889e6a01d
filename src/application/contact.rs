//! Contact form intake and admin review.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::application::repos::{ContactRepo, NewContactSubmission};
use crate::application::validation::{optional_text, require};
use crate::domain::entities::ContactSubmissionRecord;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactAck {
    pub success: bool,
    pub id: String,
}

#[derive(Clone)]
pub struct ContactService {
    repo: Arc<dyn ContactRepo>,
}

impl ContactService {
    pub fn new(repo: Arc<dyn ContactRepo>) -> Self {
        Self { repo }
    }

    pub async fn submit(&self, payload: ContactPayload) -> Result<ContactAck, ServiceError> {
        require(&[
            ("name", payload.name.as_deref()),
            ("email", payload.email.as_deref()),
            ("subject", payload.subject.as_deref()),
            ("message", payload.message.as_deref()),
        ])?;

        let submission = NewContactSubmission {
            name: payload.name.unwrap_or_default().trim().to_string(),
            email: payload.email.unwrap_or_default().trim().to_string(),
            phone: optional_text(payload.phone),
            subject: payload.subject.unwrap_or_default().trim().to_string(),
            message: payload.message.unwrap_or_default().trim().to_string(),
        };
        let record = self
            .repo
            .create_submission(submission)
            .await
            .map_err(ServiceError::repo("Failed to submit contact form"))?;

        info!(
            target = "vetrina::application::contact",
            submission_id = %record.id,
            "contact submission stored"
        );
        Ok(ContactAck {
            success: true,
            id: record.id.to_string(),
        })
    }

    pub async fn list(&self) -> Result<Vec<ContactSubmissionRecord>, ServiceError> {
        self.repo
            .list_submissions()
            .await
            .map_err(ServiceError::repo("Failed to fetch contact submissions"))
    }

    pub async fn get(&self, id: Uuid) -> Result<ContactSubmissionRecord, ServiceError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(ServiceError::repo("Failed to fetch contact submission"))?
            .ok_or_else(|| ServiceError::not_found("contact submission"))
    }
}
