//! The `sync` command: one reconcile cycle against the shared remote.
//!
//! The working copy plays the role of the session's local state, carried
//! across invocations. Sign-in fetches the remote (or seeds a fresh
//! account); a working copy written after the fetched sync point is the
//! settled result of earlier local edits and gets pushed.

use std::path::PathBuf;

use chrono::Utc;

use crate::cli::args::OutputFormat;
use crate::config::{Config, Paths};
use crate::error::TaskTreeError;
use crate::output;
use crate::storage;
use crate::sync::{DirBlobStore, PollingSync, StaticAuth};

/// Run one reconcile cycle.
///
/// # Errors
///
/// Returns an error when no remote/user is configured, or when the cycle
/// ends in a fatal teardown (the session's user-visible message is what the
/// error displays).
pub fn sync(
    paths: &Paths,
    config: &Config,
    remote: Option<PathBuf>,
    user: Option<String>,
    format: OutputFormat,
) -> Result<String, TaskTreeError> {
    let remote_root = remote
        .or_else(|| config.general.remote.clone().map(PathBuf::from))
        .ok_or_else(|| {
            TaskTreeError::Config("no remote directory; pass --remote or set general.remote".to_string())
        })?;
    let user = user.or_else(|| config.general.user.clone()).ok_or_else(|| {
        TaskTreeError::Config("no identity; pass --user or set general.user".to_string())
    })?;

    let local = storage::load_state(paths)?;
    let local_written_at = storage::state_modified_at(paths)?;

    let mut engine = PollingSync::new(
        StaticAuth::signed_in(user),
        DirBlobStore::new(remote_root),
        config.sync.clone(),
    );
    let now = Utc::now();
    engine.sign_in(now)?;

    let mut action = "pulled remote state";
    if let (Some(local), Some(written_at)) = (local, local_written_at) {
        if local != *engine.state() && written_at > engine.session().synced_at() {
            engine.mutate(now, |state| *state = local);
            engine.flush_pending(now)?;
            action = "pushed local state";
        } else if local == *engine.state() {
            action = "already in sync";
        }
    }

    storage::save_state(paths, engine.state())?;
    output::format_message(&format!("Sync complete: {action}"), format)
}
