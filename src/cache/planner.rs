//! Merges drained events into one invalidation plan.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use super::events::{CacheEvent, Epoch};
use super::surfaces::Surface;

/// Paths to evict locally and to revalidate remotely.
///
/// Both sets are deduplicated and iterate in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationPlan {
    pub surfaces: BTreeSet<Surface>,
    pub page_paths: BTreeSet<String>,
    pub api_prefixes: BTreeSet<String>,
    /// Highest epoch folded into this plan.
    pub latest_epoch: Option<Epoch>,
}

impl fmt::Display for InvalidationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InvalidationPlan {{ surfaces: {}, pages: {}, api_prefixes: {} }}",
            self.surfaces.len(),
            self.page_paths.len(),
            self.api_prefixes.len(),
        )
    }
}

impl InvalidationPlan {
    pub fn from_events(events: Vec<CacheEvent>) -> Self {
        let mut plan = Self::default();
        let mut seen_ids = HashSet::new();

        for event in events.into_iter().filter(|e| seen_ids.insert(e.id)) {
            plan.latest_epoch = plan.latest_epoch.max(Some(event.epoch));
            for surface in Surface::affected_by(&event.kind) {
                if plan.surfaces.contains(&surface) {
                    continue;
                }
                plan.page_paths.extend(surface.page_paths());
                plan.api_prefixes.extend(surface.api_prefixes());
                plan.surfaces.insert(surface);
            }
        }

        plan
    }

    pub fn is_empty(&self) -> bool {
        self.page_paths.is_empty() && self.api_prefixes.is_empty()
    }

    pub fn page_paths(&self) -> Vec<String> {
        self.page_paths.iter().cloned().collect()
    }
}
