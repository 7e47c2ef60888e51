use crate::FileDiff;
use std::sync::Mutex;
use uuid::Uuid;

/// The two read capabilities and one write capability the engine needs from
/// the host's chat-state container (spec.md §6). Not part of the core; the
/// real implementation is supplied by the chat UI. `InMemoryChatState` below
/// is the one local implementation this workspace ships, so the engine and
/// CLI are runnable standalone.
pub trait ChatStateBridge: Send + Sync {
    fn active_chat_id(&self) -> Option<Uuid>;
    fn last_user_message_id(&self) -> Option<Uuid>;
    fn publish_pending_edits(&self, diffs: &[FileDiff]);
}

#[derive(Debug, Default)]
struct State {
    chat_id: Option<Uuid>,
    last_user_message_id: Option<Uuid>,
    pending_edits: Vec<FileDiff>,
}

/// A `Mutex`-guarded in-process chat state container, enough to drive the
/// engine from the CLI or from tests without a real chat UI wired in.
#[derive(Debug, Default)]
pub struct InMemoryChatState {
    state: Mutex<State>,
}

impl InMemoryChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_active_chat(&self, chat_id: Uuid) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).chat_id = Some(chat_id);
    }

    pub fn set_last_user_message(&self, message_id: Uuid) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last_user_message_id = Some(message_id);
    }

    pub fn pending_edits(&self) -> Vec<FileDiff> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pending_edits
            .clone()
    }
}

impl ChatStateBridge for InMemoryChatState {
    fn active_chat_id(&self) -> Option<Uuid> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).chat_id
    }

    fn last_user_message_id(&self) -> Option<Uuid> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last_user_message_id
    }

    fn publish_pending_edits(&self, diffs: &[FileDiff]) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pending_edits = diffs.to_vec();
    }
}
