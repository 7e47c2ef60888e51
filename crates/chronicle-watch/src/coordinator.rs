//! `WatcherCoordinator`: watches exactly the set of paths with pending
//! changes and turns external filesystem events into `USER_SAVE` history
//! nodes (spec.md §4.5), built on `notify` the way
//! `deepseek-agent::watch::WatchDaemon` builds its comment watcher.

use chronicle_core::lock::LockRegistry;
use chronicle_core::logging::log_warn;
use chronicle_engine::{DiffHistoryService, Trigger};
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// An external filesystem event translated into the two cases §4.5 cares
/// about, independent of the raw `notify::Event` shape.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathEvent {
    Changed(String),
    Removed(String),
}

/// Watches the dynamic set of paths currently present in `getDiff()`,
/// re-subscribing after every history mutation, and folds external
/// `change`/`unlink` events into the shared `DiffHistoryService` (spec.md
/// §4.5). The watcher itself only ever sees paths the caller told it
/// about; it never walks the filesystem on its own.
pub struct WatcherCoordinator {
    watcher: Mutex<RecommendedWatcher>,
    watched: Mutex<BTreeSet<String>>,
    locks: Arc<LockRegistry>,
}

impl WatcherCoordinator {
    /// `on_event` is invoked from the watcher's background thread for every
    /// non-ignored change/unlink; callers are expected to hand it straight
    /// to a `DiffHistoryService` guarded by a mutex, the same way a real
    /// host serializes calls into the engine from multiple threads.
    pub fn new(locks: Arc<LockRegistry>, on_event: impl Fn(PathEventKind, String) + Send + 'static) -> notify::Result<Self> {
        let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
        let watcher = RecommendedWatcher::new(tx, NotifyConfig::default())?;
        let locks_for_thread = locks.clone();

        std::thread::spawn(move || {
            event_loop(rx, locks_for_thread, on_event);
        });

        Ok(Self {
            watcher: Mutex::new(watcher),
            watched: Mutex::new(BTreeSet::new()),
            locks,
        })
    }

    /// Re-evaluate the watch set against the given pending paths, watching
    /// new ones and unwatching ones no longer present (spec.md §4.5: "Paths
    /// no longer in the set are unwatched; new ones are added").
    pub fn sync_watch_set(&self, pending_paths: &BTreeSet<String>) {
        let mut watched = self.watched.lock().unwrap_or_else(|e| e.into_inner());
        let mut watcher = self.watcher.lock().unwrap_or_else(|e| e.into_inner());

        for path in pending_paths.difference(&watched) {
            if let Err(e) = watcher.watch(Path::new(path), RecursiveMode::NonRecursive) {
                log_warn(&format!("watch {path} failed: {e}"));
            }
        }
        for path in watched.difference(pending_paths) {
            if let Err(e) = watcher.unwatch(Path::new(path)) {
                log_warn(&format!("unwatch {path} failed: {e}"));
            }
        }
        *watched = pending_paths.clone();
    }

    pub fn locks(&self) -> Arc<LockRegistry> {
        self.locks.clone()
    }
}

/// Exported so host code building `on_event` closures can match on it
/// without reaching into this module's private `PathEvent` translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEventKind {
    Changed,
    Removed,
}

fn event_loop(
    rx: mpsc::Receiver<notify::Result<Event>>,
    locks: Arc<LockRegistry>,
    on_event: impl Fn(PathEventKind, String),
) {
    for result in rx {
        let event = match result {
            Ok(event) => event,
            Err(e) => {
                log_warn(&format!("watcher error: {e}"));
                continue;
            }
        };
        for translated in translate(&event) {
            let path = match &translated {
                PathEvent::Changed(p) | PathEvent::Removed(p) => p.clone(),
            };
            if locks.contains(&path) {
                continue;
            }
            match translated {
                PathEvent::Changed(p) => on_event(PathEventKind::Changed, p),
                PathEvent::Removed(p) => on_event(PathEventKind::Removed, p),
            }
        }
    }
}

fn translate(event: &Event) -> Vec<PathEvent> {
    let kind = match event.kind {
        EventKind::Modify(_) | EventKind::Create(_) => PathEventKind::Changed,
        EventKind::Remove(_) => PathEventKind::Removed,
        _ => return Vec::new(),
    };
    event
        .paths
        .iter()
        .map(|p| {
            let path = p.to_string_lossy().to_string();
            match kind {
                PathEventKind::Changed => PathEvent::Changed(path),
                PathEventKind::Removed => PathEvent::Removed(path),
            }
        })
        .collect()
}

/// Applies a translated event to the engine, per spec.md §4.5: a `change`
/// reads the new content and folds it into the current node's files with
/// no accepted paths; an `unlink` removes the path the same way.
pub fn apply_external_event(service: &mut DiffHistoryService, kind: PathEventKind, path: &str) {
    let mut files = match service.current_files() {
        Some(files) => files,
        None => return,
    };
    match kind {
        PathEventKind::Changed => match std::fs::read_to_string(path) {
            Ok(content) => {
                files.insert(path.to_string(), content);
            }
            Err(e) => {
                log_warn(&format!("external change to {path} could not be read: {e}"));
                return;
            }
        },
        PathEventKind::Removed => {
            files.remove(path);
        }
    }
    service.push_snapshot(Trigger::UserSave, files, Default::default());
}
