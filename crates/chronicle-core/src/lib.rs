//! Shared types and ambient plumbing for the Chronicle diff history engine:
//! the runtime-directory convention, on-disk config, and the lightweight
//! stderr logging the rest of the workspace logs through.

pub mod config;
pub mod lock;
pub mod logging;

use std::path::{Path, PathBuf};

pub type Result<T> = anyhow::Result<T>;

/// Directory the engine may use for its own bookkeeping (config, log file)
/// underneath a workspace root. The engine itself holds no history here;
/// per spec, history does not survive a process restart, so this is only
/// for config and the stderr-mirrored log file.
pub fn runtime_dir(workspace: &Path) -> PathBuf {
    workspace.join(".chronicle")
}

pub use config::EngineConfig;
pub use lock::LockRegistry;
