use std::sync::{Mutex, MutexGuard};

use tracing::warn;

/// Locks `lock`, recovering the guard if a previous holder panicked.
pub(crate) fn mutex_lock<'a, T>(
    lock: &'a Mutex<T>,
    target: &'static str,
    op: &'static str,
) -> MutexGuard<'a, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        warn!(
            target = "vetrina::cache::lock",
            op,
            module = target,
            "recovered poisoned cache lock"
        );
        poisoned.into_inner()
    })
}
