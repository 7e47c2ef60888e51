//! `LockRegistry`, the single source of truth for "is this filesystem event
//! mine?" (spec.md §4.4/§9). A plain set of paths, no counts, no per-write
//! identifiers, shared between `DiffHistoryService::lock_for_agent` and the
//! watcher's disk-writing procedure.

use std::collections::BTreeSet;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct LockRegistry {
    paths: Mutex<BTreeSet<String>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self {
            paths: Mutex::new(BTreeSet::new()),
        }
    }

    /// Idempotent: re-adding a locked path is a no-op.
    pub fn add(&self, path: &str) {
        self.paths
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_string());
    }

    pub fn remove(&self, path: &str) {
        self.paths
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(path);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(path)
    }
}

/// Schedule `registry.remove(path)` to run after `delay`, on its own thread.
/// The 500ms default grace period (spec.md §4.4/§9) absorbs watcher event
/// delivery latency; this helper is how both the engine's `unlock_for_agent`
/// and the watcher's write procedure implement that grace period.
pub fn release_after_delay(registry: std::sync::Arc<LockRegistry>, path: String, delay: Duration) {
    std::thread::spawn(move || {
        std::thread::sleep(delay);
        registry.remove(&path);
    });
}
