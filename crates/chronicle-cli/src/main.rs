use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

mod commands;
mod output;
mod session;

use commands::{handle_error, run_accept, run_diff, run_edit, run_init, run_reject, run_revert, run_watch};

#[derive(Parser)]
#[command(name = "chronicle")]
#[command(about = "Thin host process around the diff history engine", long_about = None)]
struct Cli {
    /// Print machine-readable JSON instead of a human summary.
    #[arg(long, global = true)]
    json: bool,

    /// Verbose error output (includes context, not just the message).
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Chat identity to seed the in-process bridge with (defaults to a
    /// fresh id on `init`, and to whatever the session file already has
    /// for every other subcommand).
    #[arg(long = "chat-id", global = true)]
    chat_id: Option<Uuid>,

    /// User-message identity for this turn.
    #[arg(long = "message-id", global = true)]
    message_id: Option<Uuid>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seed the initial snapshot from a directory's current contents.
    Init { path: PathBuf },
    /// Record an agent edit to one file.
    Edit {
        path: PathBuf,
        file: String,
        #[arg(long)]
        delete: bool,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        stdin: bool,
    },
    /// Show pending changes since the last accept/reject.
    Diff { path: PathBuf },
    /// Show pending changes since the start of the session.
    SessionDiff { path: PathBuf },
    /// Bless the current pending changes as the new baseline.
    Accept {
        path: PathBuf,
        #[arg(long)]
        paths: Vec<String>,
    },
    /// Discard the current pending changes.
    Reject {
        path: PathBuf,
        #[arg(long)]
        paths: Vec<String>,
    },
    /// Rewind to just before the given user message.
    Revert { path: PathBuf, message_id: String },
    /// Run the filesystem watcher in the foreground.
    Watch { path: PathBuf },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Init { path } => run_init(&path, cli.chat_id, cli.message_id, cli.json),
        Command::Edit { path, file, delete, content, stdin } => {
            run_edit(&path, &file, delete, content, stdin, cli.chat_id, cli.message_id, cli.json)
        }
        Command::Diff { path } => run_diff(&path, false, cli.json),
        Command::SessionDiff { path } => run_diff(&path, true, cli.json),
        Command::Accept { path, paths } => run_accept(&path, paths, cli.json),
        Command::Reject { path, paths } => run_reject(&path, paths, cli.json),
        Command::Revert { path, message_id } => run_revert(&path, &message_id, cli.json),
        Command::Watch { path } => run_watch(path),
    };

    if let Err(e) = result {
        handle_error(e, cli.verbose);
    }
}
