use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("`{field}` must not be negative")]
    NegativeAmount { field: &'static str },
    #[error("unknown {kind} `{value}`")]
    UnknownVariant { kind: &'static str, value: String },
}

impl DomainError {
    pub fn negative_amount(field: &'static str) -> Self {
        Self::NegativeAmount { field }
    }

    pub fn unknown_variant(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.into(),
        }
    }
}
