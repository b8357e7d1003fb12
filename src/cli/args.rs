use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "tasktree")]
#[command(about = "A hierarchical task list kept in sync with a remote copy")]
#[command(long_about = "tasktree - a hierarchical task list

Tasks live in a tree: top-level categories hold nested tasks, and a
reserved trash root collects discarded ones. The working copy sits in
~/.tasktree/state.json and can be reconciled with a shared remote
directory via 'tasktree sync'.

QUICK START:
  tasktree show                 Print the tree
  tasktree add \"Buy milk\"       Add a top-level task
  tasktree add \"Step 1\" --under 4    Nest under node 4
  tasktree done 4               Toggle completion
  tasktree sync --remote /mnt/shared --user alice")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results (defaults to the configured one)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

/// A persisted display setting.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Setting {
    /// Hide completed tasks in listings.
    HideDone,
    /// Dark mode preference (carried for UI consumers).
    DarkMode,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the task tree
    #[command(alias = "ls")]
    Show,

    /// Add a task
    ///
    /// Without --under the task is placed at top level, immediately above
    /// the trash root. Selecting the trash root or anything inside it also
    /// places the task at top level.
    #[command(alias = "a")]
    Add {
        /// Task text
        value: String,
        /// Id of the parent node to nest under
        #[arg(long)]
        under: Option<String>,
    },

    /// Toggle a task's completion state
    #[command(alias = "d")]
    Done {
        /// Node id
        id: String,
    },

    /// Replace a task's text
    Edit {
        /// Node id
        id: String,
        /// New text
        value: String,
    },

    /// Move a node (with its subtree) to a new parent
    Move {
        /// Node id
        id: String,
        /// Id of the new parent
        #[arg(long, conflicts_with = "top")]
        to: Option<String>,
        /// Move to the top level instead
        #[arg(long)]
        top: bool,
    },

    /// Move a node into the trash
    Trash {
        /// Node id
        id: String,
    },

    /// Discard everything in the trash
    EmptyTrash,

    /// Change a persisted display setting
    Set {
        /// Which setting to change
        setting: Setting,
        /// New value
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },

    /// Export a backup (TaskTree_Backup.json by default)
    Export {
        /// Destination file
        path: Option<PathBuf>,
    },

    /// Import a backup, replacing local state wholesale
    Import {
        /// Backup file to read
        path: PathBuf,
    },

    /// Reconcile the working copy with the shared remote directory
    ///
    /// Runs one poll/push cycle: fetches the remote copy when it is newer
    /// than the last sync point, otherwise pushes local edits made since.
    Sync {
        /// Root of the shared remote directory
        #[arg(long, env = "TASKTREE_REMOTE")]
        remote: Option<PathBuf>,
        /// Identity to sync as
        #[arg(long, env = "TASKTREE_USER")]
        user: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}
