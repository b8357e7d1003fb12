//! Command handlers.
//!
//! Each handler loads the working copy (falling back to the seed forest on
//! first run), applies one mutation through the tree engine, writes the
//! copy back, and returns the formatted result. The working copy is the
//! "local state" the sync command later reconciles with the remote.

mod sync;

use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::Shell;

use crate::backup;
use crate::cli::args::{Cli, OutputFormat, Setting};
use crate::config::Paths;
use crate::error::TaskTreeError;
use crate::output;
use crate::storage;
use crate::tree::{ops, seed, AppState};

pub use sync::sync;

fn load_or_seed(paths: &Paths) -> Result<AppState, TaskTreeError> {
    Ok(storage::load_state(paths)?
        .unwrap_or_else(|| AppState::with_items(seed::seed_forest())))
}

/// Print the task tree.
///
/// # Errors
///
/// Returns an error if the working copy cannot be read.
pub fn show(paths: &Paths, format: OutputFormat) -> Result<String, TaskTreeError> {
    let state = load_or_seed(paths)?;
    output::format_state(&state, format)
}

/// Add a task, nested under `--under` or at top level.
///
/// # Errors
///
/// Returns an error if the working copy cannot be read or written.
pub fn add(
    paths: &Paths,
    value: &str,
    under: Option<&str>,
    format: OutputFormat,
) -> Result<String, TaskTreeError> {
    let mut state = load_or_seed(paths)?;
    match ops::add_task(&mut state.items, under, value) {
        Some(id) => {
            storage::save_state(paths, &state)?;
            output::format_message(&format!("Added task #{id}"), format)
        }
        None => output::format_message(
            &format!("No node with id {}; nothing added", under.unwrap_or("?")),
            format,
        ),
    }
}

/// Toggle a task's completion state.
///
/// # Errors
///
/// Returns an error if the working copy cannot be read or written.
pub fn done(paths: &Paths, id: &str, format: OutputFormat) -> Result<String, TaskTreeError> {
    let mut state = load_or_seed(paths)?;
    if !ops::toggle_done(&mut state.items, id) {
        return output::format_message(&format!("No node with id {id}"), format);
    }
    storage::save_state(paths, &state)?;
    let done = ops::find_node(&state.items, id).is_some_and(crate::tree::TreeNode::done_or_default);
    output::format_message(
        &format!("Task #{id} is now {}", if done { "done" } else { "open" }),
        format,
    )
}

/// Replace a task's text.
///
/// # Errors
///
/// Returns an error if the working copy cannot be read or written.
pub fn edit(
    paths: &Paths,
    id: &str,
    value: &str,
    format: OutputFormat,
) -> Result<String, TaskTreeError> {
    let mut state = load_or_seed(paths)?;
    if !ops::set_value(&mut state.items, id, value) {
        return output::format_message(&format!("No node with id {id}"), format);
    }
    storage::save_state(paths, &state)?;
    output::format_message(&format!("Updated task #{id}"), format)
}

/// Re-parent a node, or move it to the top level.
///
/// # Errors
///
/// Returns an error if the working copy cannot be read or written.
pub fn move_task(
    paths: &Paths,
    id: &str,
    to: Option<&str>,
    top: bool,
    format: OutputFormat,
) -> Result<String, TaskTreeError> {
    let mut state = load_or_seed(paths)?;
    let moved = match (to, top) {
        (Some(parent), _) => ops::move_node(&mut state.items, id, parent),
        (None, true) => ops::move_node_to_top_level(&mut state.items, id),
        (None, false) => {
            return output::format_message("Specify --to <id> or --top", format);
        }
    };
    if !moved {
        return output::format_message(&format!("Cannot move node {id}"), format);
    }
    storage::save_state(paths, &state)?;
    output::format_message(&format!("Moved node {id}"), format)
}

/// Move a node into the trash.
///
/// # Errors
///
/// Returns an error if the working copy cannot be read or written.
pub fn trash(paths: &Paths, id: &str, format: OutputFormat) -> Result<String, TaskTreeError> {
    let mut state = load_or_seed(paths)?;
    if !ops::move_to_trash(&mut state.items, id) {
        return output::format_message(&format!("Cannot trash node {id}"), format);
    }
    storage::save_state(paths, &state)?;
    output::format_message(&format!("Moved node {id} to trash"), format)
}

/// Discard everything in the trash.
///
/// # Errors
///
/// Returns an error if the working copy cannot be read or written.
pub fn empty_trash(paths: &Paths, format: OutputFormat) -> Result<String, TaskTreeError> {
    let mut state = load_or_seed(paths)?;
    let count = ops::empty_trash(&mut state.items);
    storage::save_state(paths, &state)?;
    output::format_message(&format!("Discarded {count} item(s)"), format)
}

/// Change a persisted display setting.
///
/// # Errors
///
/// Returns an error if the working copy cannot be read or written.
pub fn set(
    paths: &Paths,
    setting: Setting,
    value: bool,
    format: OutputFormat,
) -> Result<String, TaskTreeError> {
    let mut state = load_or_seed(paths)?;
    let name = match setting {
        Setting::HideDone => {
            state.hide_done_items = value;
            "hide-done"
        }
        Setting::DarkMode => {
            state.dark_mode = value;
            "dark-mode"
        }
    };
    storage::save_state(paths, &state)?;
    output::format_message(&format!("Set {name} to {value}"), format)
}

/// Export a backup file.
///
/// # Errors
///
/// Returns an error if the working copy cannot be read or the backup
/// cannot be written.
pub fn export(
    paths: &Paths,
    path: Option<PathBuf>,
    format: OutputFormat,
) -> Result<String, TaskTreeError> {
    let state = load_or_seed(paths)?;
    let target = path.unwrap_or_else(|| PathBuf::from(backup::BACKUP_FILE_NAME));
    backup::export_state(&state, &target)?;
    output::format_message(&format!("Exported backup to {}", target.display()), format)
}

/// Import a backup file, replacing the working copy wholesale.
///
/// A rejected file leaves the prior working copy untouched.
///
/// # Errors
///
/// Returns an error if the file is malformed, fails validation, or cannot
/// be read.
pub fn import(paths: &Paths, path: &Path, format: OutputFormat) -> Result<String, TaskTreeError> {
    let state = backup::import_state(path)?;
    storage::save_state(paths, &state)?;
    output::format_message(&format!("Imported backup from {}", path.display()), format)
}

/// Generate shell completions on stdout.
pub fn completions(shell: Shell) -> String {
    let mut cmd = Cli::command();
    let mut buf = Vec::new();
    clap_complete::generate(shell, &mut cmd, "tasktree", &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
