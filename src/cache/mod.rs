//! Storefront invalidation dispatcher.
//!
//! Admin mutations publish [`EventKind`]s once the store call has returned.
//! The [`CacheConsumer`] drains them, merges them into an [`InvalidationPlan`],
//! evicts the matching public API responses from the local [`ResponseStore`]
//! and notifies the remote rendering layer through a [`Revalidator`].
//!
//! ```toml
//! [cache]
//! enable_response_cache = true
//! response_limit = 512
//! response_ttl_seconds = 60
//! ```

mod config;
mod consumer;
mod events;
mod lock;
mod middleware;
mod planner;
mod remote;
mod store;
mod surfaces;
mod trigger;

pub use config::CacheConfig;
pub use consumer::{CacheConsumer, ConsumeReport};
pub use events::{CacheEvent, Epoch, EventKind, EventQueue};
pub use middleware::{CacheState, response_cache_layer};
pub use planner::InvalidationPlan;
pub use remote::{RevalidationError, Revalidator};
pub use store::{CachedResponse, ResponseKey, ResponseStore};
pub use surfaces::{PRODUCT_PAGE_PATHS, Surface};
pub use trigger::CacheTrigger;
