use crate::TimelineNode;
use chronicle_core::logging::log_warn;

/// The append-only-with-truncation vector of `TimelineNode`s plus a cursor.
/// `cursor` is `-1` for an empty store; otherwise it's always a valid index
/// into `nodes` (spec.md §3, invariant 1).
#[derive(Debug, Default)]
pub struct HistoryStore {
    nodes: Vec<TimelineNode>,
    cursor: isize,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            cursor: -1,
        }
    }

    /// Rebuild a store from its raw parts, used by hosts that serialize
    /// the timeline themselves across process restarts (spec.md §9
    /// "Persisted state layout: None" describes the engine's own contract;
    /// this constructor doesn't change that, it just lets a caller hand
    /// back nodes it persisted on its own).
    pub fn from_parts(nodes: Vec<TimelineNode>, cursor: isize) -> Self {
        Self { nodes, cursor }
    }

    pub fn nodes(&self) -> &[TimelineNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn node(&self, index: usize) -> Option<&TimelineNode> {
        self.nodes.get(index)
    }

    pub fn first(&self) -> Option<&TimelineNode> {
        self.nodes.first()
    }

    /// Mutable access to node 0, used only by `add_initial_snapshot_if_needed`'s
    /// back-fill path (spec.md §4.6.1), the sole exception alongside
    /// `current_mut` to history nodes otherwise being immutable once appended.
    pub fn first_mut(&mut self) -> Option<&mut TimelineNode> {
        self.nodes.first_mut()
    }

    pub fn current(&self) -> Option<&TimelineNode> {
        if self.cursor < 0 {
            None
        } else {
            self.nodes.get(self.cursor as usize)
        }
    }

    pub fn current_mut(&mut self) -> Option<&mut TimelineNode> {
        if self.cursor < 0 {
            None
        } else {
            let idx = self.cursor as usize;
            self.nodes.get_mut(idx)
        }
    }

    /// Find the first node whose `user_message_id` matches `id`.
    pub fn position_of_message(&self, id: uuid::Uuid) -> Option<usize> {
        self.nodes.iter().position(|n| n.user_message_id == id)
    }

    /// Append `node`, truncating any "future" (undone) nodes first if the
    /// cursor isn't already at the tail. This is branching (spec.md §3,
    /// invariant 3; §9 "arena+cursor").
    pub fn push(&mut self, node: TimelineNode) {
        if self.cursor < self.nodes.len() as isize - 1 {
            let keep = (self.cursor + 1).max(0) as usize;
            if self.nodes.len() > keep {
                log_warn(&format!(
                    "branching: truncating {} future node(s) before append",
                    self.nodes.len() - keep
                ));
            }
            self.nodes.truncate(keep);
        }
        self.nodes.push(node);
        self.cursor = self.nodes.len() as isize - 1;
    }

    /// Move the cursor without touching the node vector (used by
    /// `revert_to_message`; per spec.md §9 Open Question 3, indices past the
    /// new cursor are left in place until the next `push` truncates them).
    pub fn set_cursor(&mut self, index: usize) {
        self.cursor = index as isize;
    }
}
