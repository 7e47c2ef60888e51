use crate::{FileMap, Trigger};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// One immutable point in history. `files` is deep-copied on entry (it's an
/// owned `FileMap`, not a reference, so a clone happens at the call site,
/// see `HistoryStore::push`), so a caller mutating its own copy afterwards
/// cannot reach back into history (spec.md §9, "FileMap as value, not
/// shared").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineNode {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub chat_id: Uuid,
    pub user_message_id: Uuid,
    pub trigger: Trigger,
    pub files: FileMap,
    /// Paths whose value at this node becomes part of the computed
    /// baseline. A path present here but absent from `files` encodes an
    /// accepted deletion.
    pub accepted_paths: BTreeSet<String>,
}

impl TimelineNode {
    pub fn new(
        chat_id: Uuid,
        user_message_id: Uuid,
        trigger: Trigger,
        files: FileMap,
        accepted_paths: BTreeSet<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            chat_id,
            user_message_id,
            trigger,
            files,
            accepted_paths,
        }
    }
}
