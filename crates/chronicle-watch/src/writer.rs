//! Concrete `DiskWriter`: the lock-before-write procedure from spec.md §4.4.

use chronicle_core::lock::{release_after_delay, LockRegistry};
use chronicle_core::logging::{log_info, log_warn};
use chronicle_engine::{DiskWriter, Plan};
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Writes a `Plan` to disk, fencing every touched path with the shared
/// `LockRegistry` so the coordinator's own `notify` events don't get
/// replayed back into history (spec.md §4.4).
pub struct FileDiskWriter {
    locks: Arc<LockRegistry>,
    release_delay: Duration,
}

impl FileDiskWriter {
    pub fn new(locks: Arc<LockRegistry>) -> Self {
        Self {
            locks,
            release_delay: Duration::from_millis(500),
        }
    }

    pub fn with_release_delay(mut self, delay: Duration) -> Self {
        self.release_delay = delay;
        self
    }

    /// Same write procedure as `execute`, but returns the spawned join
    /// handles so tests can wait for the fan-out to actually land on disk
    /// instead of racing the background threads.
    pub fn execute_and_collect(&self, plan: &Plan) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();
        for (path, content) in &plan.writes {
            handles.push(self.spawn_write(path.clone(), content.clone()));
        }
        for path in &plan.deletes {
            handles.push(self.spawn_delete(path.clone()));
        }
        handles
    }

    fn spawn_write(&self, path: String, content: String) -> JoinHandle<()> {
        self.locks.add(&path);
        let locks = self.locks.clone();
        let delay = self.release_delay;
        std::thread::spawn(move || {
            if let Some(parent) = Path::new(&path).parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    log_warn(&format!("write {path}: create_dir_all failed: {e}"));
                }
            }
            match std::fs::write(&path, &content) {
                Ok(()) => log_info(&format!("wrote {path}")),
                Err(e) => log_warn(&format!("write {path} failed: {e}")),
            }
            std::thread::sleep(delay);
            locks.remove(&path);
        })
    }

    fn spawn_delete(&self, path: String) -> JoinHandle<()> {
        self.locks.add(&path);
        let locks = self.locks.clone();
        let delay = self.release_delay;
        std::thread::spawn(move || {
            match std::fs::remove_file(&path) {
                Ok(()) => log_info(&format!("deleted {path}")),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => log_warn(&format!("delete {path} failed: {e}")),
            }
            std::thread::sleep(delay);
            locks.remove(&path);
        })
    }
}

impl DiskWriter for FileDiskWriter {
    /// Fire-and-forget: spawns one thread per touched path and returns
    /// immediately. There is no cross-file atomicity guarantee (spec.md
    /// §4.4); a failure on one path is logged but never aborts the rest
    /// of the fan-out.
    fn execute(&self, plan: &Plan) {
        for (path, content) in &plan.writes {
            self.spawn_write(path.clone(), content.clone());
        }
        for path in &plan.deletes {
            self.spawn_delete(path.clone());
        }
    }
}

/// Suppress the watcher for a path a caller is about to write itself
/// (spec.md §4.4's `lockForAgent`/`unlockForAgent`, exposed here for hosts
/// that drive `FileDiskWriter` directly rather than through
/// `DiffHistoryService`).
pub fn lock_for_write(locks: &LockRegistry, path: &str) {
    locks.add(path);
}

pub fn unlock_after_write(locks: Arc<LockRegistry>, path: &str, delay: Duration) {
    release_after_delay(locks, path.to_string(), delay);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_engine::Plan;
    use std::collections::BTreeMap;

    #[test]
    fn write_then_delete_round_trip_is_reflected_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt").to_string_lossy().to_string();

        let locks = Arc::new(LockRegistry::new());
        let writer = FileDiskWriter::new(locks.clone()).with_release_delay(Duration::from_millis(5));

        let mut writes = BTreeMap::new();
        writes.insert(path.clone(), "hello".to_string());
        let plan = Plan {
            writes,
            deletes: Vec::new(),
        };
        for h in writer.execute_and_collect(&plan) {
            h.join().unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
        assert!(!locks.contains(&path));

        let plan = Plan {
            writes: BTreeMap::new(),
            deletes: vec![path.clone()],
        };
        for h in writer.execute_and_collect(&plan) {
            h.join().unwrap();
        }
        assert!(!Path::new(&path).exists());
    }

    #[test]
    fn path_is_locked_for_the_duration_of_the_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.txt").to_string_lossy().to_string();

        let locks = Arc::new(LockRegistry::new());
        let writer =
            FileDiskWriter::new(locks.clone()).with_release_delay(Duration::from_millis(50));

        let mut writes = BTreeMap::new();
        writes.insert(path.clone(), "x".to_string());
        let plan = Plan {
            writes,
            deletes: Vec::new(),
        };
        let handles = writer.execute_and_collect(&plan);
        assert!(locks.contains(&path));
        for h in handles {
            h.join().unwrap();
        }
        assert!(!locks.contains(&path));
    }

    #[test]
    fn deleting_a_missing_file_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt").to_string_lossy().to_string();
        let locks = Arc::new(LockRegistry::new());
        let writer = FileDiskWriter::new(locks).with_release_delay(Duration::from_millis(1));
        let plan = Plan {
            writes: BTreeMap::new(),
            deletes: vec![path],
        };
        for h in writer.execute_and_collect(&plan) {
            h.join().unwrap();
        }
    }
}
