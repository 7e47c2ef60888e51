//! Minimal stderr logging, in the teacher's own style (`deepseek-observe`):
//! no tracing/log dependency, just prefixed `eprintln!` plus an optional
//! append-only mirror file under the runtime directory.

use crate::{Result, runtime_dir};
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Log an informational message to stderr with the `[chronicle]` prefix.
pub fn log_info(msg: &str) {
    eprintln!("[chronicle] {msg}");
}

/// Log a warning to stderr with the `[chronicle WARN]` prefix. Used at every
/// point spec.md §7 calls for "log" on a recoverable condition.
pub fn log_warn(msg: &str) {
    eprintln!("[chronicle WARN] {msg}");
}

/// Append-only mirror of warnings to `<workspace>/.chronicle/chronicle.log`,
/// for callers (like the CLI) that want a durable trail across invocations.
/// Failures to write the mirror are themselves non-fatal; they're logged
/// to stderr and dropped, matching the engine's "nothing here is fatal" rule.
pub struct LogMirror {
    log_path: PathBuf,
}

impl LogMirror {
    pub fn new(workspace: &Path) -> Result<Self> {
        let dir = runtime_dir(workspace);
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            log_path: dir.join("chronicle.log"),
        })
    }

    pub fn warn(&self, msg: &str) {
        log_warn(msg);
        if let Err(e) = self.append_line(&format!("{} WARN {msg}", Utc::now().to_rfc3339())) {
            log_warn(&format!("failed to mirror log line to disk: {e}"));
        }
    }

    pub fn info(&self, msg: &str) {
        log_info(msg);
        let _ = self.append_line(&format!("{} INFO {msg}", Utc::now().to_rfc3339()));
    }

    fn append_line(&self, line: &str) -> Result<()> {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}
