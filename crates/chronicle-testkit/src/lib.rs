//! Scratch-workspace fixture for exercising the engine end-to-end, the way
//! `deepseek-testkit` wraps `AgentEngine` behind one smoke-test entry point.

use chronicle_core::lock::LockRegistry;
use chronicle_engine::{ChatStateBridge, DiffHistoryService, FileMap, InMemoryChatState};
use chronicle_watch::FileDiskWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

/// A tempdir-backed scenario: a real `DiffHistoryService` wired to a real
/// `FileDiskWriter`, so writes/deletes from accept/reject/revert actually
/// land on disk and can be asserted on.
pub struct Scenario {
    dir: TempDir,
    pub bridge: Arc<InMemoryChatState>,
    pub service: DiffHistoryService,
    locks: Arc<LockRegistry>,
}

impl Scenario {
    pub fn new() -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let bridge = Arc::new(InMemoryChatState::new());
        bridge.set_active_chat(Uuid::now_v7());
        bridge.set_last_user_message(Uuid::now_v7());
        let locks = Arc::new(LockRegistry::new());
        let writer = Arc::new(FileDiskWriter::new(locks.clone()));
        let service = DiffHistoryService::with_writer(bridge.clone(), writer);
        Ok(Self { dir, bridge, service, locks })
    }

    pub fn workspace(&self) -> &Path {
        self.dir.path()
    }

    /// A path under the scratch workspace, as the string key the engine
    /// tracks `FileMap` entries by.
    pub fn path(&self, rel: &str) -> String {
        self.dir.path().join(rel).to_string_lossy().to_string()
    }

    /// Start a new user turn: advances `last_user_message_id`, returns it.
    pub fn new_turn(&self) -> Uuid {
        let id = Uuid::now_v7();
        self.bridge.set_last_user_message(id);
        id
    }

    pub fn write_on_disk(&self, rel: &str, content: &str) -> anyhow::Result<()> {
        let full = PathBuf::from(self.path(rel));
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(full, content)?;
        Ok(())
    }

    pub fn read_on_disk(&self, rel: &str) -> anyhow::Result<String> {
        Ok(std::fs::read_to_string(self.path(rel))?)
    }

    pub fn exists_on_disk(&self, rel: &str) -> bool {
        PathBuf::from(self.path(rel)).exists()
    }

    pub fn locks(&self) -> Arc<LockRegistry> {
        self.locks.clone()
    }

    /// Seed the initial snapshot from a `{relative path: content}` map.
    pub fn seed(&mut self, files: &[(&str, &str)]) {
        let map: FileMap = files
            .iter()
            .map(|(rel, content)| (self.path(rel), content.to_string()))
            .collect();
        self.service.add_initial_snapshot_if_needed(&map);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_scenario_has_no_pending_diff() {
        let mut scenario = Scenario::new().unwrap();
        scenario.seed(&[("a.txt", "v0")]);
        assert!(scenario.service.get_diff().is_empty());
    }

    #[test]
    fn accept_then_reject_round_trips_through_real_disk() {
        let mut scenario = Scenario::new().unwrap();
        scenario.seed(&[("a.txt", "v0")]);
        scenario.service.push_agent_edit(&scenario.path("a.txt"), Some("v1".to_string()));
        scenario.service.accept_pending_changes();
        scenario.service.push_agent_edit(&scenario.path("a.txt"), Some("v2".to_string()));
        scenario.service.reject_pending_changes();
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert_eq!(scenario.read_on_disk("a.txt").unwrap(), "v1");
    }
}
