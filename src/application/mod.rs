//! Application services layer.

pub mod admin;
pub mod contact;
pub mod error;
pub mod repos;
pub mod storefront;
pub mod validation;
