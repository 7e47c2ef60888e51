use crate::{Result, runtime_dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunables the spec calls out as "configurable but not required" (the
/// lock-release grace period) plus one purely ambient safety valve
/// (`max_history_nodes`), defaulted off so it never changes spec-mandated
/// behavior unless a caller opts in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Milliseconds the engine keeps a path in `LockRegistry` after its
    /// write/delete completes, to absorb delayed watcher event delivery.
    pub lock_release_delay_ms: u64,
    /// Milliseconds the watcher coalesces bursts of filesystem events
    /// before re-scanning the pending-path set.
    pub watch_debounce_ms: u64,
    /// Soft cap on history length, logged-but-not-enforced (see DESIGN.md).
    pub max_history_nodes: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_release_delay_ms: 500,
            watch_debounce_ms: 50,
            max_history_nodes: None,
        }
    }
}

impl EngineConfig {
    pub fn config_path(workspace: &Path) -> std::path::PathBuf {
        runtime_dir(workspace).join("config.toml")
    }

    pub fn load(workspace: &Path) -> Result<Self> {
        let path = Self::config_path(workspace);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Load the config if present, otherwise write and return the default.
    pub fn ensure(workspace: &Path) -> Result<Self> {
        let path = Self::config_path(workspace);
        if path.exists() {
            return Self::load(workspace);
        }
        fs::create_dir_all(
            path.parent()
                .ok_or_else(|| anyhow::anyhow!("invalid config path"))?,
        )?;
        let cfg = Self::default();
        cfg.save(workspace)?;
        Ok(cfg)
    }

    pub fn save(&self, workspace: &Path) -> Result<()> {
        let path = Self::config_path(workspace);
        fs::create_dir_all(
            path.parent()
                .ok_or_else(|| anyhow::anyhow!("invalid config path"))?,
        )?;
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}
