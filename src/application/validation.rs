//! Input normalisation shared by the mutation services.

use serde::{Deserialize, Deserializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};
use tracing::debug;

use crate::application::error::ServiceError;

/// Fails when any listed value is absent or blank.
///
/// The message always names every required field of the payload, in the
/// order given, e.g. `"Name, email, subject, and message are required"`.
pub fn require(fields: &[(&'static str, Option<&str>)]) -> Result<(), ServiceError> {
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, value)| value.is_none_or(|v| v.trim().is_empty()))
        .map(|(label, _)| *label)
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    debug!(
        target = "vetrina::application::validation",
        missing = ?missing,
        "required fields missing"
    );
    let labels: Vec<&str> = fields.iter().map(|(label, _)| *label).collect();
    Err(ServiceError::validation(required_message(&labels)))
}

pub fn required_message(labels: &[&str]) -> String {
    let joined = match labels {
        [] => String::new(),
        [only] => (*only).to_string(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    };
    let mut chars = joined.chars();
    let capitalised = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    let verb = if labels.len() == 1 { "is" } else { "are" };
    format!("{capitalised} {verb} required")
}

/// Trims a text value; blank input becomes `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Applies a partial-update text patch.
///
/// `None` keeps the stored value, an empty string clears it.
pub fn patch_text(current: Option<String>, patch: Option<String>) -> Option<String> {
    match patch {
        None => current,
        Some(value) => optional_text(Some(value)),
    }
}

/// Applies a patch to a required text field; blank input is rejected.
pub fn patch_required(
    current: String,
    patch: Option<String>,
    label: &'static str,
) -> Result<String, ServiceError> {
    match patch {
        None => Ok(current),
        Some(value) if value.trim().is_empty() => {
            Err(ServiceError::validation(required_message(&[label])))
        }
        Some(value) => Ok(value.trim().to_string()),
    }
}

/// Trims tags, drops blanks and keeps the first occurrence of each.
pub fn normalize_tags(tags: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !seen.iter().any(|existing: &String| existing == tag) {
            seen.push(tag.to_string());
        }
    }
    seen
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`). Use with `#[serde(default, deserialize_with = ...)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parses RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (UTC) or `YYYY-MM-DD` (UTC midnight).
pub fn parse_timestamp(value: &str, label: &'static str) -> Result<OffsetDateTime, ServiceError> {
    let value = value.trim();
    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
        return Ok(parsed);
    }
    let with_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let without_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]");
    if let Ok(parsed) = PrimitiveDateTime::parse(value, with_seconds)
        .or_else(|_| PrimitiveDateTime::parse(value, without_seconds))
    {
        return Ok(parsed.assume_utc());
    }
    if let Ok(date) = Date::parse(value, format_description!("[year]-[month]-[day]")) {
        return Ok(date.midnight().assume_utc());
    }
    Err(ServiceError::validation(format!("Invalid {label}")))
}

/// Applies a timestamp patch: absent keeps, `null` or blank clears.
pub fn patch_timestamp(
    current: Option<OffsetDateTime>,
    patch: Option<Option<String>>,
    label: &'static str,
) -> Result<Option<OffsetDateTime>, ServiceError> {
    match patch {
        None => Ok(current),
        Some(None) => Ok(None),
        Some(Some(value)) if value.trim().is_empty() => Ok(None),
        Some(Some(value)) => parse_timestamp(&value, label).map(Some),
    }
}
