//! Storefront backend: public catalogue API, admin back-office and cache
//! revalidation for a content-managed shop.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
