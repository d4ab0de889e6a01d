//! Infrastructure adapters and runtime bootstrap.

pub mod db;
pub mod error;
pub mod http;
pub mod object_store;
pub mod revalidation;
pub mod telemetry;
