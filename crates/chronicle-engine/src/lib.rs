//! The core of the diff history engine: a timeline-based snapshot store that
//! answers, cheaply and correctly, what's pending, what accept/reject/revert
//! must write or delete, and how rewinding still lets new edits branch
//! forward without leaking ghost history.

mod baseline;
mod bridge;
mod diff;
mod filemap;
mod history;
mod node;
mod planner;
mod service;
mod trigger;
mod writer;

pub use baseline::BaselineEngine;
pub use bridge::{ChatStateBridge, InMemoryChatState};
pub use diff::{DiffEngine, FileDiff};
pub use filemap::FileMap;
pub use history::HistoryStore;
pub use node::TimelineNode;
pub use planner::{OperationPlanner, Plan};
pub use service::DiffHistoryService;
pub use trigger::Trigger;
pub use writer::{DiskWriter, NoopDiskWriter};
