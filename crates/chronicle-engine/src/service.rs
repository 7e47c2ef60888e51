use crate::{
    BaselineEngine, ChatStateBridge, DiffEngine, DiskWriter, FileDiff, FileMap, HistoryStore,
    NoopDiskWriter, OperationPlanner, Plan, Trigger,
};
use chronicle_core::lock::{LockRegistry, release_after_delay};
use chronicle_core::logging::log_warn;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// The public surface of the timeline-based snapshot store (spec.md §4.6).
/// Owns the history and the lock registry; disk I/O is delegated to a
/// `DiskWriter`, chat identity to a `ChatStateBridge`.
pub struct DiffHistoryService {
    history: HistoryStore,
    bridge: Arc<dyn ChatStateBridge>,
    writer: Arc<dyn DiskWriter>,
    locks: Arc<LockRegistry>,
    lock_release_delay: Duration,
}

impl DiffHistoryService {
    pub fn new(bridge: Arc<dyn ChatStateBridge>) -> Self {
        Self::with_writer(bridge, Arc::new(NoopDiskWriter))
    }

    pub fn with_writer(bridge: Arc<dyn ChatStateBridge>, writer: Arc<dyn DiskWriter>) -> Self {
        Self {
            history: HistoryStore::new(),
            bridge,
            writer,
            locks: Arc::new(LockRegistry::new()),
            lock_release_delay: Duration::from_millis(500),
        }
    }

    /// Resume with a `HistoryStore` a host reconstructed itself, e.g. from
    /// a CLI session file. The engine still never persists anything on its
    /// own (spec.md §9); this only accepts what the caller already loaded.
    pub fn resume(
        history: HistoryStore,
        bridge: Arc<dyn ChatStateBridge>,
        writer: Arc<dyn DiskWriter>,
    ) -> Self {
        Self {
            history,
            bridge,
            writer,
            locks: Arc::new(LockRegistry::new()),
            lock_release_delay: Duration::from_millis(500),
        }
    }

    pub fn history_nodes(&self) -> &[crate::TimelineNode] {
        self.history.nodes()
    }

    pub fn with_lock_release_delay(mut self, delay: Duration) -> Self {
        self.lock_release_delay = delay;
        self
    }

    /// Shared handle to the lock registry, for wiring a `WatcherCoordinator`
    /// up to the same lock set the disk writer uses.
    pub fn lock_registry(&self) -> Arc<LockRegistry> {
        self.locks.clone()
    }

    // ---- §4.6.1 ---------------------------------------------------------

    /// Seed or extend the initial snapshot. Never call this for files the
    /// agent is newly *creating*; `push_agent_edit` alone handles creation
    /// (spec.md §4.6.1).
    pub fn add_initial_snapshot_if_needed(&mut self, files: &FileMap) {
        if self.history.is_empty() {
            let Some(chat_id) = self.bridge.active_chat_id() else {
                log_warn("add_initial_snapshot_if_needed: no active chat, refusing");
                return;
            };
            let Some(user_message_id) = self.bridge.last_user_message_id() else {
                log_warn("add_initial_snapshot_if_needed: no last user message, refusing");
                return;
            };
            let accepted: BTreeSet<String> = files.keys().cloned().collect();
            self.history.push(crate::TimelineNode::new(
                chat_id,
                user_message_id,
                Trigger::InitialLoad,
                files.clone(),
                accepted,
            ));
            self.publish_diff();
            return;
        }

        let baseline = BaselineEngine::compute(&self.history, self.history.cursor());
        let initial_files = self.history.first().expect("non-empty history").files.clone();
        let current_files = self
            .history
            .current()
            .expect("non-empty history has a current node")
            .files
            .clone();

        let mut new_files = current_files.clone();
        let mut absorbed = BTreeSet::new();

        for (path, content) in files {
            let in_initial = initial_files.contains_key(path);
            let in_current = current_files.contains_key(path);
            if !in_initial && !in_current {
                // Back-fill: the agent is touching a file for the first
                // time that wasn't part of the original snapshot or the
                // current tracked set.
                if let Some(first) = self.history_first_mut() {
                    first.files.insert(path.clone(), content.clone());
                }
            } else if in_initial && baseline.get(path) != Some(content) {
                // Cold-start external-change absorption (spec.md §4.5/§9
                // Open Question 1): promote the discrepancy straight into
                // the baseline as an accepted UserSave. Collected across the
                // whole batch and pushed as one node so that absorbing path
                // B doesn't roll back path A's already-absorbed content.
                new_files.insert(path.clone(), content.clone());
                absorbed.insert(path.clone());
            }
        }

        if !absorbed.is_empty() {
            self.push_snapshot(Trigger::UserSave, new_files, absorbed);
        }
    }

    fn history_first_mut(&mut self) -> Option<&mut crate::TimelineNode> {
        // HistoryStore exposes only current_mut; node 0 is only ever
        // mutated by this one backfill path (spec.md §4.6.1), so we reach
        // it through a small accessor kept private to this module.
        self.history.first_mut()
    }

    // ---- §4.6.2 ---------------------------------------------------------

    pub fn push_agent_edit(&mut self, path: &str, after: Option<String>) {
        let mut files = self
            .history
            .current()
            .map(|n| n.files.clone())
            .unwrap_or_default();
        match after {
            Some(content) => {
                files.insert(path.to_string(), content);
            }
            None => {
                files.remove(path);
            }
        }
        self.push_snapshot(Trigger::AgentEdit, files, BTreeSet::new());
    }

    // ---- §4.6.3 ---------------------------------------------------------

    /// Low-level primitive. Refuses (logs, does not mutate) if there is no
    /// active chat or no last user-message id.
    pub fn push_snapshot(
        &mut self,
        trigger: Trigger,
        files: FileMap,
        accepted_paths: BTreeSet<String>,
    ) -> bool {
        let Some(chat_id) = self.bridge.active_chat_id() else {
            log_warn("push_snapshot: no active chat, refusing push");
            return false;
        };
        let Some(user_message_id) = self.bridge.last_user_message_id() else {
            log_warn("push_snapshot: no last user message id, refusing push");
            return false;
        };
        self.history.push(crate::TimelineNode::new(
            chat_id,
            user_message_id,
            trigger,
            files,
            accepted_paths,
        ));
        self.publish_diff();
        true
    }

    // ---- §4.6.4 / §4.6.5 --------------------------------------------------

    /// The current node's tracked files, for callers (the watcher) that
    /// need to fold an externally observed change into them. `None` on an
    /// empty history.
    pub fn current_files(&self) -> Option<FileMap> {
        self.history.current().map(|n| n.files.clone())
    }

    pub fn get_diff(&self) -> Vec<FileDiff> {
        if self.history.is_empty() {
            return Vec::new();
        }
        let baseline = BaselineEngine::compute(&self.history, self.history.cursor());
        let current = &self.history.current().expect("non-empty history").files;
        DiffEngine::diff(&baseline, current)
    }

    pub fn get_session_diff(&self) -> Vec<FileDiff> {
        if self.history.is_empty() {
            return Vec::new();
        }
        let first = &self.history.first().expect("non-empty history").files;
        let current = &self.history.current().expect("non-empty history").files;
        DiffEngine::diff(first, current)
    }

    /// Exactly the set of paths a `WatcherCoordinator` should be watching:
    /// paths with pending changes (spec.md §4.5). Re-derive after every
    /// mutation rather than caching: the set is cheap to recompute and
    /// staleness here would mean watching the wrong files.
    pub fn pending_paths(&self) -> BTreeSet<String> {
        self.get_diff().into_iter().map(|d| d.path).collect()
    }

    fn publish_diff(&self) {
        self.bridge.publish_pending_edits(&self.get_diff());
    }

    // ---- §4.6.6 ---------------------------------------------------------

    pub fn accept_pending_changes(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let cursor = self.history.cursor();
        let prev_baseline = if cursor <= 0 {
            self.history.first().expect("non-empty history").files.clone()
        } else {
            BaselineEngine::compute(&self.history, cursor - 1)
        };
        let current_files = self.history.current().expect("non-empty history").files.clone();

        let mut accepted: BTreeSet<String> = current_files.keys().cloned().collect();
        for path in prev_baseline.keys() {
            if !current_files.contains_key(path) {
                accepted.insert(path.clone());
            }
        }

        if let Some(node) = self.history.current_mut() {
            node.accepted_paths = accepted;
        }
        self.publish_diff();
    }

    // ---- §4.6.7 ---------------------------------------------------------

    pub fn partial_accept(&mut self, paths: &[String]) {
        if self.history.is_empty() {
            log_warn("partial_accept: empty history, no-op");
            return;
        }
        let files = self.history.current().expect("non-empty history").files.clone();
        self.push_snapshot(
            Trigger::PartialUserAccept,
            files,
            paths.iter().cloned().collect(),
        );
    }

    // ---- §4.6.8 ---------------------------------------------------------

    pub fn reject_pending_changes(&mut self) -> Plan {
        if self.history.is_empty() {
            return Plan::empty();
        }
        let cursor = self.history.cursor();
        let target = BaselineEngine::compute(&self.history, cursor);
        let current = self.history.current().expect("non-empty history").files.clone();
        let plan = OperationPlanner::plan(&current, &target);

        let accepted: BTreeSet<String> = target.keys().cloned().collect();
        self.push_snapshot(Trigger::UserReject, target, accepted);
        self.execute(&plan);
        plan
    }

    // ---- §4.6.9 ---------------------------------------------------------

    pub fn partial_reject(&mut self, paths: &[String]) -> Plan {
        if self.history.is_empty() {
            // spec.md §9 Open Question 2 / Redesign Flag: the original
            // throws here; this rewrite returns a no-op plan instead.
            return Plan::empty();
        }
        let baseline = BaselineEngine::compute(&self.history, self.history.cursor());
        let mut new_files = self.history.current().expect("non-empty history").files.clone();
        for path in paths {
            match baseline.get(path) {
                Some(content) => {
                    new_files.insert(path.clone(), content.clone());
                }
                None => {
                    new_files.remove(path);
                }
            }
        }
        let current = self.history.current().expect("non-empty history").files.clone();
        let plan = OperationPlanner::plan(&current, &new_files);

        self.push_snapshot(Trigger::UserReject, new_files, BTreeSet::new());
        self.execute(&plan);
        plan
    }

    // ---- §4.6.10 ----------------------------------------------------------

    pub fn revert_to_message(&mut self, user_message_id: Uuid) -> Option<Plan> {
        let found = self.history.position_of_message(user_message_id)?;
        let target_index = if found == 0 {
            log_warn("revert_to_message: clamping to index 0 (undoing past the beginning)");
            0
        } else {
            found - 1
        };

        let current = self
            .history
            .current()
            .map(|n| n.files.clone())
            .unwrap_or_default();
        let target_files = self
            .history
            .node(target_index)
            .expect("target_index is in range")
            .files
            .clone();
        let plan = OperationPlanner::plan(&current, &target_files);

        self.history.set_cursor(target_index);
        self.execute(&plan);
        self.publish_diff();
        Some(plan)
    }

    fn execute(&self, plan: &Plan) {
        self.writer.execute(plan);
    }

    // ---- lock/unlock for callers doing their own writes (spec.md §4.4/§6) --

    pub fn lock_for_agent(&self, path: &str) {
        self.locks.add(path);
    }

    pub fn unlock_for_agent(&self, path: &str) {
        release_after_delay(self.locks.clone(), path.to_string(), self.lock_release_delay);
    }

    pub fn is_locked(&self, path: &str) -> bool {
        self.locks.contains(path)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn cursor(&self) -> isize {
        self.history.cursor()
    }
}
