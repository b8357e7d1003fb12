//! Local working copy persistence.
//!
//! The CLI keeps the app state in `~/.tasktree/state.json` between
//! invocations. Loading goes through the same repair-then-validate gate as
//! any other external payload, so a hand-edited or truncated file is
//! rejected instead of half-applied.

use chrono::{DateTime, Utc};

use crate::config::Paths;
use crate::error::TaskTreeError;
use crate::tree::validate::{decode_app_state, encode_app_state};
use crate::tree::AppState;

/// Load the local working copy, if one exists.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, parsed, or
/// validated.
pub fn load_state(paths: &Paths) -> Result<Option<AppState>, TaskTreeError> {
    if !paths.state_file.exists() {
        return Ok(None);
    }
    let bytes = std::fs::read(&paths.state_file)?;
    Ok(Some(decode_app_state(&bytes)?))
}

/// Write the local working copy.
///
/// # Errors
///
/// Returns an error if the state fails validation or the file cannot be
/// written.
pub fn save_state(paths: &Paths, state: &AppState) -> Result<(), TaskTreeError> {
    paths.ensure_dirs()?;
    let bytes = encode_app_state(state)?;
    std::fs::write(&paths.state_file, bytes)?;
    Ok(())
}

/// When the local working copy was last written, if it exists.
///
/// # Errors
///
/// Returns an error if file metadata cannot be read.
pub fn state_modified_at(paths: &Paths) -> Result<Option<DateTime<Utc>>, TaskTreeError> {
    if !paths.state_file.exists() {
        return Ok(None);
    }
    let modified = std::fs::metadata(&paths.state_file)?.modified()?;
    Ok(Some(DateTime::<Utc>::from(modified)))
}
