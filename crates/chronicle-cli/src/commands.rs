use crate::output::print_json;
use crate::session::with_service;
use anyhow::{anyhow, Result};
use chronicle_core::lock::LockRegistry;
use chronicle_core::EngineConfig;
use chronicle_engine::FileMap;
use chronicle_errors::ErrorHandler;
use chronicle_watch::{apply_external_event, WatcherCoordinator};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;
use walkdir::WalkDir;

pub(crate) fn run_init(path: &Path, chat_id: Option<Uuid>, message_id: Option<Uuid>, json: bool) -> Result<()> {
    let chat_id = chat_id.unwrap_or_else(Uuid::now_v7);
    let message_id = message_id.unwrap_or_else(Uuid::now_v7);
    let files = scan_workspace(path)?;

    with_service(path, Some(chat_id), Some(message_id), |svc| {
        svc.add_initial_snapshot_if_needed(&files);
        Ok(())
    })?;

    if json {
        print_json(&serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "files_seeded": files.len(),
        }))?;
    } else {
        println!("Initialized {} with {} tracked file(s).", path.display(), files.len());
        println!("chat-id: {chat_id}");
        println!("message-id: {message_id}");
    }
    Ok(())
}

fn scan_workspace(path: &Path) -> Result<FileMap> {
    let mut files = FileMap::new();
    for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path();
        if rel.components().any(|c| c.as_os_str() == ".chronicle") {
            continue;
        }
        if let Ok(content) = std::fs::read_to_string(rel) {
            files.insert(rel.to_string_lossy().to_string(), content);
        }
    }
    Ok(files)
}

pub(crate) fn run_edit(
    path: &Path,
    file: &str,
    delete: bool,
    content: Option<String>,
    stdin: bool,
    chat_id: Option<Uuid>,
    message_id: Option<Uuid>,
    json: bool,
) -> Result<()> {
    let after = if delete {
        None
    } else if stdin {
        use std::io::Read;
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Some(buf)
    } else {
        Some(content.ok_or_else(|| anyhow!("pass --content or --stdin for a non-deleting edit"))?)
    };

    let diff = with_service(path, chat_id, message_id, |svc| {
        svc.push_agent_edit(file, after);
        Ok(svc.get_diff())
    })?;

    if json {
        print_json(&diff)?;
    } else if diff.is_empty() {
        println!("no pending changes");
    } else {
        print_diff(&diff);
    }
    Ok(())
}

pub(crate) fn run_diff(path: &Path, session: bool, json: bool) -> Result<()> {
    let diff = with_service(path, None, None, |svc| {
        Ok(if session { svc.get_session_diff() } else { svc.get_diff() })
    })?;

    if json {
        print_json(&diff)?;
    } else if diff.is_empty() {
        println!("no pending changes");
    } else {
        print_diff(&diff);
    }
    Ok(())
}

fn print_diff(diff: &[chronicle_engine::FileDiff]) {
    for d in diff {
        match (&d.before, &d.after) {
            (None, Some(_)) => println!("+ {}", d.path),
            (Some(_), None) => println!("- {}", d.path),
            _ => println!("~ {}", d.path),
        }
    }
}

pub(crate) fn run_accept(path: &Path, paths: Vec<String>, json: bool) -> Result<()> {
    with_service(path, None, None, |svc| {
        if paths.is_empty() {
            svc.accept_pending_changes();
        } else {
            svc.partial_accept(&paths);
        }
        Ok(())
    })?;
    if json {
        print_json(&serde_json::json!({"accepted": true}))?;
    } else {
        println!("accepted");
    }
    Ok(())
}

pub(crate) fn run_reject(path: &Path, paths: Vec<String>, json: bool) -> Result<()> {
    let plan = with_service(path, None, None, |svc| {
        Ok(if paths.is_empty() {
            svc.reject_pending_changes()
        } else {
            svc.partial_reject(&paths)
        })
    })?;
    if json {
        print_json(&plan)?;
    } else {
        println!(
            "rejected: {} write(s), {} delete(s) scheduled",
            plan.writes.len(),
            plan.deletes.len()
        );
    }
    Ok(())
}

pub(crate) fn run_revert(path: &Path, message_id: &str, json: bool) -> Result<()> {
    let id = Uuid::parse_str(message_id)?;
    let plan = with_service(path, None, None, |svc| {
        svc.revert_to_message(id)
            .ok_or_else(|| chronicle_errors::ChronicleError::UnknownMessageId(message_id.to_string()).into())
    })?;
    if json {
        print_json(&plan)?;
    } else {
        println!(
            "reverted: {} write(s), {} delete(s) scheduled",
            plan.writes.len(),
            plan.deletes.len()
        );
    }
    Ok(())
}

pub(crate) fn run_watch(path: PathBuf) -> Result<()> {
    let config = EngineConfig::ensure(&path)?;
    let debounce = std::time::Duration::from_millis(config.watch_debounce_ms);
    let locks = Arc::new(LockRegistry::new());
    let workspace = path.clone();

    let coordinator = {
        let workspace = workspace.clone();
        WatcherCoordinator::new(locks.clone(), move |kind, event_path| {
            let svc = crate::session::with_service(&workspace, None, None, |svc| {
                apply_external_event(svc, kind, &event_path);
                Ok(svc.get_diff())
            });
            match svc {
                Ok(diff) if !diff.is_empty() => {
                    println!("USER_SAVE absorbed: {event_path}");
                }
                Ok(_) => {}
                Err(e) => eprintln!("[chronicle WARN] watch handler failed: {e}"),
            }
        })?
    };

    println!("watching {} (ctrl-c to stop)", path.display());
    loop {
        let pending = with_service(&path, None, None, |svc| Ok(svc.pending_paths()))?;
        coordinator.sync_watch_set(&pending);
        std::thread::sleep(debounce);
    }
}

pub(crate) fn handle_error(err: anyhow::Error, verbose: bool) -> ! {
    eprint!("{}", ErrorHandler::new().verbose(verbose).handle(&err));
    std::process::exit(1);
}
