//! The CLI is one invocation per subcommand, but spec.md §9 is explicit that
//! the engine itself never persists history across process restarts. To let
//! `chronicle init` / `edit` / `diff` / ... chain meaningfully across
//! separate invocations anyway, this module is the CLI's own glue layer: it
//! serializes exactly what `DiffHistoryService` was holding in memory to
//! `.chronicle/session.json` and reloads it next time, the way
//! `deepseek-cli`'s `PatchStore` persists its own state around an otherwise
//! in-memory component.

use anyhow::Result;
use chronicle_core::{runtime_dir, EngineConfig};
use chronicle_engine::{ChatStateBridge, DiffHistoryService, HistoryStore, InMemoryChatState, TimelineNode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct SessionState {
    nodes: Vec<TimelineNode>,
    cursor: isize,
    chat_id: Option<Uuid>,
    last_user_message_id: Option<Uuid>,
}

impl SessionState {
    fn path(workspace: &Path) -> std::path::PathBuf {
        runtime_dir(workspace).join("session.json")
    }

    fn load(workspace: &Path) -> Result<Self> {
        let path = Self::path(workspace);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, workspace: &Path) -> Result<()> {
        let path = Self::path(workspace);
        std::fs::create_dir_all(runtime_dir(workspace))?;
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Load the session file (if any), build a service around it, hand it to
/// `body`, then persist whatever the body left behind. `chat_id`/`message_id`
/// from CLI flags win over what the session file already had, the same
/// precedence a chat UI would give its own in-process state over a stale
/// snapshot.
pub(crate) fn with_service<R>(
    workspace: &Path,
    chat_id: Option<Uuid>,
    message_id: Option<Uuid>,
    body: impl FnOnce(&mut DiffHistoryService) -> Result<R>,
) -> Result<R> {
    let state = SessionState::load(workspace)?;
    let bridge = Arc::new(InMemoryChatState::new());
    if let Some(id) = chat_id.or(state.chat_id) {
        bridge.set_active_chat(id);
    }
    if let Some(id) = message_id.or(state.last_user_message_id) {
        bridge.set_last_user_message(id);
    }

    let config = EngineConfig::ensure(workspace)?;
    let lock_release_delay = Duration::from_millis(config.lock_release_delay_ms);

    let history = HistoryStore::from_parts(state.nodes, state.cursor);
    let writer = Arc::new(
        chronicle_watch::FileDiskWriter::new(Arc::new(chronicle_core::lock::LockRegistry::new()))
            .with_release_delay(lock_release_delay),
    );
    let mut service = DiffHistoryService::resume(history, bridge.clone(), writer)
        .with_lock_release_delay(lock_release_delay);

    let result = body(&mut service)?;

    let new_state = SessionState {
        nodes: service.history_nodes().to_vec(),
        cursor: service.cursor(),
        chat_id: bridge.active_chat_id(),
        last_user_message_id: bridge.last_user_message_id(),
    };
    new_state.save(workspace)?;
    Ok(result)
}
