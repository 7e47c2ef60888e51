//! The side-effecting half of the diff history engine: a `DiskWriter` that
//! actually touches the filesystem, and a `WatcherCoordinator` that turns
//! `notify` events into history nodes. `chronicle-engine` stays pure and
//! testable without either of these; hosts wire them in at the edge.

mod coordinator;
mod writer;

pub use coordinator::{apply_external_event, PathEventKind, WatcherCoordinator};
pub use writer::{lock_for_write, unlock_after_write, FileDiskWriter};
