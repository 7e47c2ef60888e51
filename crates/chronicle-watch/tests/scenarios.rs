//! spec.md §8 scenarios that exercise the real filesystem watcher (5 and 6);
//! the disk-free scenarios live in chronicle-engine's own test suite.

use chronicle_core::lock::LockRegistry;
use chronicle_engine::{ChatStateBridge, DiffHistoryService, FileMap, InMemoryChatState};
use chronicle_watch::{apply_external_event, PathEventKind, WatcherCoordinator};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

fn files(pairs: &[(&str, &str)]) -> FileMap {
    pairs.iter().map(|(p, c)| (p.to_string(), c.to_string())).collect()
}

/// Drains events fired by the background watcher thread into the shared
/// `DiffHistoryService`, serialized behind one mutex the way a real host
/// would serialize calls into the engine from multiple threads.
struct Harness {
    service: Arc<Mutex<DiffHistoryService>>,
    coordinator: WatcherCoordinator,
}

impl Harness {
    fn new() -> Self {
        let bridge = Arc::new(InMemoryChatState::new());
        bridge.set_active_chat(Uuid::now_v7());
        bridge.set_last_user_message(Uuid::now_v7());
        let locks = Arc::new(LockRegistry::new());
        let service = Arc::new(Mutex::new(DiffHistoryService::new(bridge)));

        let service_for_events = service.clone();
        let coordinator = WatcherCoordinator::new(locks, move |kind, path| {
            let mut svc = service_for_events.lock().unwrap_or_else(|e| e.into_inner());
            apply_external_event(&mut svc, kind, &path);
        })
        .expect("watcher starts");

        Self { service, coordinator }
    }

    fn sync(&self) {
        let paths = self.service.lock().unwrap_or_else(|e| e.into_inner()).pending_paths();
        self.coordinator.sync_watch_set(&paths);
    }
}

#[test]
fn scenario_5_external_save_during_pending_lands_as_a_user_save_node() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    let path_str = path.to_string_lossy().to_string();
    std::fs::write(&path, "orig").unwrap();

    let harness = Harness::new();
    {
        let mut svc = harness.service.lock().unwrap();
        svc.add_initial_snapshot_if_needed(&files(&[(&path_str, "orig")]));
        svc.push_agent_edit(&path_str, Some("agent".to_string()));
    }
    harness.sync();
    // Let the watcher subscription settle before the external write lands.
    std::thread::sleep(Duration::from_millis(100));

    std::fs::write(&path, "user").unwrap();
    std::thread::sleep(Duration::from_millis(400));

    let svc = harness.service.lock().unwrap();
    let diff = svc.get_diff();
    assert_eq!(diff.len(), 1);
    assert_eq!(diff[0].after, Some("user".to_string()));
}

#[test]
fn scenario_6_locked_write_is_not_echoed_into_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    let path_str = path.to_string_lossy().to_string();
    std::fs::write(&path, "orig").unwrap();

    let harness = Harness::new();
    let len_before;
    {
        let mut svc = harness.service.lock().unwrap();
        svc.add_initial_snapshot_if_needed(&files(&[(&path_str, "orig")]));
        svc.push_agent_edit(&path_str, Some("e1".to_string()));
        svc.lock_for_agent(&path_str);
        len_before = svc.history_len();
    }
    harness.sync();
    std::thread::sleep(Duration::from_millis(100));

    std::fs::write(&path, "echo").unwrap();
    std::thread::sleep(Duration::from_millis(300));

    let svc = harness.service.lock().unwrap();
    assert_eq!(svc.history_len(), len_before);
    let diff = svc.get_diff();
    assert_eq!(diff[0].after, Some("e1".to_string()));
}
