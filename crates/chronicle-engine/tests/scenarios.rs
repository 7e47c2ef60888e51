//! End-to-end scenarios from spec.md §8 that don't require disk I/O or a
//! filesystem watcher (those live in chronicle-watch's integration tests).

use chronicle_engine::{ChatStateBridge, DiffHistoryService, InMemoryChatState};
use std::sync::Arc;
use uuid::Uuid;

fn service() -> (DiffHistoryService, Arc<InMemoryChatState>) {
    let bridge = Arc::new(InMemoryChatState::new());
    bridge.set_active_chat(Uuid::now_v7());
    bridge.set_last_user_message(Uuid::now_v7());
    (DiffHistoryService::new(bridge.clone()), bridge)
}

fn files(pairs: &[(&str, &str)]) -> chronicle_engine::FileMap {
    pairs
        .iter()
        .map(|(p, c)| (p.to_string(), c.to_string()))
        .collect()
}

#[test]
fn scenario_1_accept_then_edit_rebases_the_baseline() {
    let (mut svc, _bridge) = service();
    svc.add_initial_snapshot_if_needed(&files(&[("T/a", "v0")]));
    svc.push_agent_edit("T/a", Some("v1".to_string()));
    svc.accept_pending_changes();
    svc.push_agent_edit("T/a", Some("v2".to_string()));

    let diff = svc.get_diff();
    assert_eq!(diff.len(), 1);
    assert_eq!(diff[0].path, "T/a");
    assert_eq!(diff[0].before, Some("v1".to_string()));
    assert_eq!(diff[0].after, Some("v2".to_string()));

    let session_diff = svc.get_session_diff();
    assert_eq!(session_diff.len(), 1);
    assert_eq!(session_diff[0].before, Some("v0".to_string()));
    assert_eq!(session_diff[0].after, Some("v2".to_string()));
}

#[test]
fn scenario_2_reject_of_a_created_file_deletes_it() {
    let (mut svc, _bridge) = service();
    svc.add_initial_snapshot_if_needed(&files(&[("T/e", "orig")]));
    svc.push_agent_edit("T/new", Some("hello".to_string()));
    let plan = svc.reject_pending_changes();

    assert!(plan.deletes.contains(&"T/new".to_string()));
    assert_eq!(svc.get_diff(), Vec::new());
}

#[test]
fn scenario_3_reject_of_a_deletion_restores_the_file() {
    let (mut svc, _bridge) = service();
    svc.add_initial_snapshot_if_needed(&files(&[("T/a", "orig")]));
    svc.push_agent_edit("T/a", None);
    let plan = svc.reject_pending_changes();

    assert_eq!(plan.writes.get("T/a"), Some(&"orig".to_string()));
}

#[test]
fn scenario_4_revert_across_two_user_turns_then_branches() {
    let bridge = Arc::new(InMemoryChatState::new());
    let chat = Uuid::now_v7();
    bridge.set_active_chat(chat);

    let m1 = Uuid::now_v7();
    bridge.set_last_user_message(m1);
    let mut svc = DiffHistoryService::new(bridge.clone());
    svc.add_initial_snapshot_if_needed(&files(&[("T/a", "orig")]));
    svc.push_agent_edit("T/a", Some("e1".to_string()));

    let m2 = Uuid::now_v7();
    bridge.set_last_user_message(m2);
    svc.push_agent_edit("T/a", Some("e2".to_string()));

    let m3 = Uuid::now_v7();
    bridge.set_last_user_message(m3);
    svc.push_agent_edit("T/a", Some("e3".to_string()));

    let plan = svc.revert_to_message(m2).expect("m2 exists in history");
    assert_eq!(plan.writes.get("T/a"), Some(&"e1".to_string()));

    assert_eq!(svc.history_len(), 4);
    svc.push_agent_edit("T/a", Some("branched".to_string()));
    assert_eq!(svc.history_len(), 3);
    assert_eq!(svc.history_len() as isize, svc.cursor() + 1);
}

#[test]
fn revert_to_unknown_message_returns_none_and_does_not_mutate() {
    let (mut svc, _bridge) = service();
    svc.add_initial_snapshot_if_needed(&files(&[("T/a", "orig")]));
    let len_before = svc.history_len();
    let cursor_before = svc.cursor();

    assert!(svc.revert_to_message(Uuid::now_v7()).is_none());
    assert_eq!(svc.history_len(), len_before);
    assert_eq!(svc.cursor(), cursor_before);
}

#[test]
fn partial_reject_is_idempotent() {
    let (mut svc, _bridge) = service();
    svc.add_initial_snapshot_if_needed(&files(&[("T/a", "orig")]));
    svc.push_agent_edit("T/a", Some("edited".to_string()));

    svc.partial_reject(&["T/a".to_string()]);
    let diff_after_first = svc.get_diff();
    svc.partial_reject(&["T/a".to_string()]);
    let diff_after_second = svc.get_diff();

    assert_eq!(diff_after_first, diff_after_second);
}

#[test]
fn partial_reject_on_empty_history_is_a_safe_no_op() {
    let bridge = Arc::new(InMemoryChatState::new());
    let mut svc = DiffHistoryService::new(bridge);
    let plan = svc.partial_reject(&["whatever".to_string()]);
    assert!(plan.is_empty());
}

#[test]
fn reject_on_empty_history_returns_empty_plan() {
    let bridge = Arc::new(InMemoryChatState::new());
    let mut svc = DiffHistoryService::new(bridge);
    assert!(svc.reject_pending_changes().is_empty());
}

#[test]
fn cumulative_edits_to_the_same_path_collapse_to_one_entry() {
    let (mut svc, _bridge) = service();
    svc.add_initial_snapshot_if_needed(&files(&[("T/a", "orig")]));
    svc.push_agent_edit("T/a", Some("v1".to_string()));
    svc.push_agent_edit("T/a", Some("v2".to_string()));

    let diff = svc.get_diff();
    let entries: Vec<_> = diff.iter().filter(|d| d.path == "T/a").collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].after, Some("v2".to_string()));
}

#[test]
fn push_snapshot_without_chat_context_is_a_refused_no_op() {
    let bridge = Arc::new(InMemoryChatState::new());
    let mut svc = DiffHistoryService::new(bridge);
    svc.push_agent_edit("T/a", Some("hi".to_string()));
    assert_eq!(svc.history_len(), 0);
}
