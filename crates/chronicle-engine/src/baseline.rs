use crate::{FileMap, HistoryStore};

/// Replays `accepted_paths` across nodes `1..=cursor` on top of the initial
/// snapshot to derive the "last committed" `FileMap` (spec.md §4.1). Never
/// stored, always recomputed.
pub struct BaselineEngine;

impl BaselineEngine {
    pub fn compute(history: &HistoryStore, cursor: isize) -> FileMap {
        if history.is_empty() {
            return FileMap::new();
        }
        let mut baseline = history
            .first()
            .expect("non-empty history has a first node")
            .files
            .clone();

        if cursor >= 1 {
            for i in 1..=cursor {
                let Some(node) = history.node(i as usize) else {
                    break;
                };
                for path in &node.accepted_paths {
                    match node.files.get(path) {
                        Some(content) => {
                            baseline.insert(path.clone(), content.clone());
                        }
                        None => {
                            baseline.remove(path);
                        }
                    }
                }
            }
        }
        baseline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HistoryStore, Trigger};
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn files(pairs: &[(&str, &str)]) -> FileMap {
        pairs
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect()
    }

    #[test]
    fn empty_history_baseline_is_empty() {
        let store = HistoryStore::new();
        assert!(BaselineEngine::compute(&store, -1).is_empty());
    }

    #[test]
    fn baseline_ignores_non_accepted_edits() {
        let mut store = HistoryStore::new();
        let chat = Uuid::now_v7();
        store.push(crate::TimelineNode::new(
            chat,
            Uuid::now_v7(),
            Trigger::InitialLoad,
            files(&[("a", "v0")]),
            BTreeSet::new(),
        ));
        store.push(crate::TimelineNode::new(
            chat,
            Uuid::now_v7(),
            Trigger::AgentEdit,
            files(&[("a", "v1")]),
            BTreeSet::new(),
        ));
        let baseline = BaselineEngine::compute(&store, store.cursor());
        assert_eq!(baseline.get("a"), Some(&"v0".to_string()));
    }

    #[test]
    fn accepted_deletion_removes_from_baseline() {
        let mut store = HistoryStore::new();
        let chat = Uuid::now_v7();
        store.push(crate::TimelineNode::new(
            chat,
            Uuid::now_v7(),
            Trigger::InitialLoad,
            files(&[("a", "v0")]),
            BTreeSet::new(),
        ));
        let mut accepted = BTreeSet::new();
        accepted.insert("a".to_string());
        store.push(crate::TimelineNode::new(
            chat,
            Uuid::now_v7(),
            Trigger::PartialUserAccept,
            FileMap::new(),
            accepted,
        ));
        let baseline = BaselineEngine::compute(&store, store.cursor());
        assert!(!baseline.contains_key("a"));
    }
}
