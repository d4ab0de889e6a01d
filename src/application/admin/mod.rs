//! Application services for the administrative surface.

pub mod announcements;
pub mod auth;
pub mod blog;
pub mod carousel;
pub mod categories;
pub mod dashboard;
pub mod products;
pub mod settings;
pub mod uploads;
