//! Site settings: bulk read, atomic bulk upsert and create-if-absent seeding.

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::histogram;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::application::error::ServiceError;
use crate::application::repos::{SettingUpsert, SettingsRepo};
use crate::cache::CacheTrigger;
use crate::domain::entities::SiteSettingRecord;

const METRIC_SETTINGS_BATCH_MS: &str = "vetrina_settings_batch_ms";
pub const DEFAULT_BATCH_BUDGET: Duration = Duration::from_secs(30);

/// Seed rows written by `initialize`: key, value, description, category, type.
pub const DEFAULT_SETTINGS: &[(&str, &str, &str, &str, &str)] = &[
    ("site_name", "Vetrina", "Store name shown in the header", "general", "string"),
    ("site_description", "", "Default meta description", "general", "string"),
    ("currency", "USD", "ISO currency code for prices", "commerce", "string"),
    ("free_shipping_threshold", "0", "Order total for free shipping", "commerce", "number"),
    ("show_sold_out_products", "true", "List sold out products", "commerce", "boolean"),
    ("contact_email", "", "Public contact address", "contact", "string"),
    ("contact_phone", "", "Public contact phone", "contact", "string"),
    ("store_address", "", "Street address shown in the footer", "contact", "string"),
    ("instagram_url", "", "Instagram profile", "social", "url"),
    ("facebook_url", "", "Facebook page", "social", "url"),
    ("announcement_speed", "50", "Banner scroll speed in pixels per second", "appearance", "number"),
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsBatchPayload {
    #[serde(default)]
    pub settings: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitializeOutcome {
    pub success: bool,
    pub created: u64,
}

#[derive(Clone)]
pub struct AdminSettingsService {
    repo: Arc<dyn SettingsRepo>,
    budget: Duration,
    cache_trigger: Option<Arc<CacheTrigger>>,
}

impl AdminSettingsService {
    pub fn new(repo: Arc<dyn SettingsRepo>, budget: Duration) -> Self {
        Self {
            repo,
            budget,
            cache_trigger: None,
        }
    }

    pub fn with_cache_trigger_opt(mut self, trigger: Option<Arc<CacheTrigger>>) -> Self {
        self.cache_trigger = trigger;
        self
    }

    pub async fn list(&self) -> Result<Vec<SiteSettingRecord>, ServiceError> {
        self.repo
            .list_settings()
            .await
            .map_err(ServiceError::repo("Failed to fetch settings"))
    }

    /// Applies every entry in one transaction or none of them.
    pub async fn update(
        &self,
        payload: SettingsBatchPayload,
    ) -> Result<Vec<SiteSettingRecord>, ServiceError> {
        let entries = parse_batch(payload.settings)?;
        let count = entries.len();
        let started_at = Instant::now();

        let result = self.repo.upsert_batch(entries, self.budget).await;
        histogram!(METRIC_SETTINGS_BATCH_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);

        let updated = result.map_err(|err| {
            warn!(
                target = "vetrina::application::admin::settings",
                error = %err,
                entries = count,
                "settings batch rolled back"
            );
            ServiceError::repo("Failed to update settings")(err)
        })?;

        info!(
            target = "vetrina::application::admin::settings",
            entries = count,
            "settings batch committed"
        );
        if let Some(trigger) = &self.cache_trigger {
            trigger.settings_changed().await;
        }
        Ok(updated)
    }

    /// Seeds [`DEFAULT_SETTINGS`] without touching keys that already exist.
    pub async fn initialize(&self) -> Result<InitializeOutcome, ServiceError> {
        let seeds = DEFAULT_SETTINGS
            .iter()
            .map(|(key, value, description, category, setting_type)| SettingUpsert {
                key: key.to_string(),
                value: value.to_string(),
                description: Some(description.to_string()),
                category: Some(category.to_string()),
                setting_type: Some(setting_type.to_string()),
            })
            .collect();
        let created = self
            .repo
            .insert_missing(seeds)
            .await
            .map_err(ServiceError::repo("Failed to initialize settings"))?;

        if created > 0
            && let Some(trigger) = &self.cache_trigger
        {
            trigger.settings_changed().await;
        }
        Ok(InitializeOutcome {
            success: true,
            created,
        })
    }
}

/// Validates the raw `settings` value into upsert entries.
///
/// Non-string values are stored in their JSON text form; a repeated key keeps
/// its last value.
fn parse_batch(raw: Value) -> Result<Vec<SettingUpsert>, ServiceError> {
    let Value::Array(items) = raw else {
        return Err(ServiceError::validation("Settings must be an array"));
    };

    let mut entries: Vec<SettingUpsert> = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(mut fields) = item else {
            return Err(ServiceError::validation("Each setting must be an object"));
        };
        let key = match fields.remove("key") {
            Some(Value::String(key)) if !key.trim().is_empty() => key.trim().to_string(),
            _ => return Err(ServiceError::validation("Each setting requires a key")),
        };
        let value = match fields.remove("value") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(value)) => value,
            Some(other) => other.to_string(),
        };
        let text = |value: Option<Value>| match value {
            Some(Value::String(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
            _ => None,
        };
        let entry = SettingUpsert {
            key,
            value,
            description: text(fields.remove("description")),
            category: text(fields.remove("category")),
            setting_type: text(fields.remove("type")),
        };
        entries.retain(|existing| existing.key != entry.key);
        entries.push(entry);
    }
    Ok(entries)
}
