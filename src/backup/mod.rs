//! Backup export and import.
//!
//! Export writes the complete `{items, hideDoneItems, darkMode}` unit as
//! pretty-printed UTF-8 JSON; import accepts the same shape and replaces
//! local state wholesale after the repair-then-validate gate. Import
//! failures are local and non-fatal: callers keep their prior in-memory
//! state untouched.

use std::path::Path;

use serde_json::Value;

use crate::error::TaskTreeError;
use crate::tree::validate::{decode_app_state, is_valid_app_state};
use crate::tree::AppState;

/// Default file name offered for downloads.
pub const BACKUP_FILE_NAME: &str = "TaskTree_Backup.json";

/// Write a pretty-printed backup of the given state.
///
/// # Errors
///
/// Returns an error if the state fails its own shape check or the file
/// cannot be written.
pub fn export_state(state: &AppState, path: &Path) -> Result<(), TaskTreeError> {
    let value = serde_json::to_value(state)?;
    if !is_valid_app_state(&value) {
        return Err(TaskTreeError::Validation(
            "refusing to export a malformed state".to_string(),
        ));
    }
    let pretty = pretty_json(&value)?;
    std::fs::write(path, pretty)?;
    Ok(())
}

/// Read a backup file, returning the validated state.
///
/// # Errors
///
/// Returns [`TaskTreeError::Parse`] for malformed JSON and
/// [`TaskTreeError::Validation`] for payloads failing the shape check.
pub fn import_state(path: &Path) -> Result<AppState, TaskTreeError> {
    let bytes = std::fs::read(path)?;
    decode_app_state(&bytes)
}

fn pretty_json(value: &Value) -> Result<String, TaskTreeError> {
    Ok(serde_json::to_string_pretty(value)?)
}
