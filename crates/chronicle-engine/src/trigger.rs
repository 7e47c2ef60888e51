use serde::{Deserialize, Serialize};

/// The closed set of reasons a `TimelineNode` was created. The tag is
/// meaningful to humans and to `BaselineEngine`'s replay rule over
/// `accepted_paths`; nothing dispatches on it otherwise (spec.md §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    InitialLoad,
    AgentEdit,
    UserSave,
    PartialUserAccept,
    UserReject,
}
