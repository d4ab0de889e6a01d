use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::application::repos::{AnnouncementParams, AnnouncementsRepo};
use crate::application::validation::{
    double_option, optional_text, patch_required, patch_text, patch_timestamp, require,
};
use crate::cache::CacheTrigger;
use crate::domain::entities::AnnouncementRecord;
use crate::domain::types::{AnnouncementKind, AnnouncementStatus};

const DEFAULT_BACKGROUND_COLOR: &str = "#000000";
const DEFAULT_TEXT_COLOR: &str = "#ffffff";
const DEFAULT_AUTO_HIDE_DELAY_MS: i32 = 5000;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementPayload {
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AnnouncementKind>,
    pub status: Option<AnnouncementStatus>,
    pub is_visible: Option<bool>,
    pub priority: Option<i32>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub is_scrolling: Option<bool>,
    pub show_close_button: Option<bool>,
    pub auto_hide: Option<bool>,
    pub auto_hide_delay: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub start_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<String>>,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
}

#[derive(Clone)]
pub struct AdminAnnouncementService {
    repo: Arc<dyn AnnouncementsRepo>,
    cache_trigger: Option<Arc<CacheTrigger>>,
}

impl AdminAnnouncementService {
    pub fn new(repo: Arc<dyn AnnouncementsRepo>) -> Self {
        Self {
            repo,
            cache_trigger: None,
        }
    }

    pub fn with_cache_trigger_opt(mut self, trigger: Option<Arc<CacheTrigger>>) -> Self {
        self.cache_trigger = trigger;
        self
    }

    /// Full records, including hidden and out-of-window announcements.
    pub async fn list(&self) -> Result<Vec<AnnouncementRecord>, ServiceError> {
        self.repo
            .list_announcements()
            .await
            .map_err(ServiceError::repo("Failed to fetch announcements"))
    }

    pub async fn get(&self, id: Uuid) -> Result<AnnouncementRecord, ServiceError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(ServiceError::repo("Failed to fetch announcement"))?
            .ok_or_else(|| ServiceError::not_found("announcement"))
    }

    pub async fn create(
        &self,
        payload: AnnouncementPayload,
    ) -> Result<AnnouncementRecord, ServiceError> {
        require(&[
            ("title", payload.title.as_deref()),
            ("message", payload.message.as_deref()),
        ])?;

        let params = AnnouncementParams {
            title: payload.title.unwrap_or_default().trim().to_string(),
            message: payload.message.unwrap_or_default().trim().to_string(),
            kind: payload.kind.unwrap_or_default(),
            status: payload.status.unwrap_or_default(),
            is_visible: payload.is_visible.unwrap_or(true),
            priority: payload.priority.unwrap_or(0),
            background_color: optional_text(payload.background_color)
                .unwrap_or_else(|| DEFAULT_BACKGROUND_COLOR.to_string()),
            text_color: optional_text(payload.text_color)
                .unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string()),
            is_scrolling: payload.is_scrolling.unwrap_or(true),
            show_close_button: payload.show_close_button.unwrap_or(true),
            auto_hide: payload.auto_hide.unwrap_or(false),
            auto_hide_delay: payload.auto_hide_delay.unwrap_or(DEFAULT_AUTO_HIDE_DELAY_MS),
            start_date: patch_timestamp(None, payload.start_date, "start date")?,
            end_date: patch_timestamp(None, payload.end_date, "end date")?,
            link_url: optional_text(payload.link_url),
            link_text: optional_text(payload.link_text),
        };
        validate(&params)?;

        let created = self
            .repo
            .create_announcement(params)
            .await
            .map_err(ServiceError::repo("Failed to create announcement"))?;
        self.notify().await;
        Ok(created)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: AnnouncementPayload,
    ) -> Result<AnnouncementRecord, ServiceError> {
        let current = self.get(id).await?;
        let params = AnnouncementParams {
            title: patch_required(current.title, payload.title, "title")?,
            message: patch_required(current.message, payload.message, "message")?,
            kind: payload.kind.unwrap_or(current.kind),
            status: payload.status.unwrap_or(current.status),
            is_visible: payload.is_visible.unwrap_or(current.is_visible),
            priority: payload.priority.unwrap_or(current.priority),
            background_color: optional_text(payload.background_color)
                .unwrap_or(current.background_color),
            text_color: optional_text(payload.text_color).unwrap_or(current.text_color),
            is_scrolling: payload.is_scrolling.unwrap_or(current.is_scrolling),
            show_close_button: payload
                .show_close_button
                .unwrap_or(current.show_close_button),
            auto_hide: payload.auto_hide.unwrap_or(current.auto_hide),
            auto_hide_delay: payload.auto_hide_delay.unwrap_or(current.auto_hide_delay),
            start_date: patch_timestamp(current.start_date, payload.start_date, "start date")?,
            end_date: patch_timestamp(current.end_date, payload.end_date, "end date")?,
            link_url: patch_text(current.link_url, payload.link_url),
            link_text: patch_text(current.link_text, payload.link_text),
        };
        validate(&params)?;

        let updated = self
            .repo
            .update_announcement(id, params)
            .await
            .map_err(ServiceError::repo("Failed to update announcement"))?;
        self.notify().await;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.repo
            .delete_announcement(id)
            .await
            .map_err(ServiceError::repo("Failed to delete announcement"))?;
        self.notify().await;
        Ok(())
    }

    async fn notify(&self) {
        if let Some(trigger) = &self.cache_trigger {
            trigger.announcements_changed().await;
        }
    }
}

fn validate(params: &AnnouncementParams) -> Result<(), ServiceError> {
    if let (Some(start), Some(end)) = (params.start_date, params.end_date)
        && start > end
    {
        return Err(ServiceError::validation("Start date must be before end date"));
    }
    if params.auto_hide_delay < 0 {
        return Err(ServiceError::validation("Auto hide delay must not be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn params() -> AnnouncementParams {
        AnnouncementParams {
            title: "t".into(),
            message: "m".into(),
            kind: AnnouncementKind::Info,
            status: AnnouncementStatus::Active,
            is_visible: true,
            priority: 0,
            background_color: DEFAULT_BACKGROUND_COLOR.into(),
            text_color: DEFAULT_TEXT_COLOR.into(),
            is_scrolling: true,
            show_close_button: true,
            auto_hide: false,
            auto_hide_delay: DEFAULT_AUTO_HIDE_DELAY_MS,
            start_date: None,
            end_date: None,
            link_url: None,
            link_text: None,
        }
    }

    #[test]
    fn inverted_window_is_rejected() {
        let mut p = params();
        p.start_date = Some(datetime!(2025-02-01 00:00 UTC));
        p.end_date = Some(datetime!(2025-01-01 00:00 UTC));
        assert!(validate(&p).is_err());

        p.end_date = p.start_date;
        assert!(validate(&p).is_ok());
    }

    #[test]
    fn payload_reads_type_field() {
        let payload: AnnouncementPayload =
            serde_json::from_str(r#"{"type":"WARNING","startDate":null}"#).expect("payload");
        assert_eq!(payload.kind, Some(AnnouncementKind::Warning));
        assert_eq!(payload.start_date, Some(None));
    }
}
