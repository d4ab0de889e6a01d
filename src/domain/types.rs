//! Shared domain enumerations aligned with persisted database enums.

use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "product_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    #[default]
    Available,
    SoldOut,
    Discontinued,
    ComingSoon,
}

impl ProductStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Available => "AVAILABLE",
            ProductStatus::SoldOut => "SOLD_OUT",
            ProductStatus::Discontinued => "DISCONTINUED",
            ProductStatus::ComingSoon => "COMING_SOON",
        }
    }

    /// Lowercase token published to the storefront.
    ///
    /// Only `SOLD_OUT` is distinguished; every other status reads as
    /// `available`. Downstream consumers rely on this two-value contract.
    pub fn public_token(self) -> &'static str {
        match self {
            ProductStatus::SoldOut => "sold_out",
            ProductStatus::Available | ProductStatus::Discontinued | ProductStatus::ComingSoon => {
                "available"
            }
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "announcement_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnnouncementStatus {
    #[default]
    Active,
    Inactive,
    Scheduled,
    Expired,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "announcement_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnnouncementKind {
    #[default]
    Info,
    Warning,
    Success,
    Error,
    Promotion,
}

/// Object-store folders an admin may request a write URL for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadKind {
    Products,
    BlogImages,
}

impl UploadKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadKind::Products => "products",
            UploadKind::BlogImages => "blog-images",
        }
    }
}

impl TryFrom<&str> for UploadKind {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "products" => Ok(UploadKind::Products),
            "blog-images" => Ok(UploadKind::BlogImages),
            other => Err(DomainError::unknown_variant("upload type", other)),
        }
    }
}
