//! JSON output formatting for tasktree.

use serde_json::json;

use crate::error::TaskTreeError;
use crate::tree::AppState;

/// Format the complete app state as JSON
///
/// # Errors
///
/// Returns `TaskTreeError::Parse` if JSON serialization fails.
pub fn format_state_json(state: &AppState) -> Result<String, TaskTreeError> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Format a status message as JSON
///
/// # Errors
///
/// Returns `TaskTreeError::Parse` if JSON serialization fails.
pub fn format_message_json(message: &str) -> Result<String, TaskTreeError> {
    let output = json!({ "message": message });
    Ok(serde_json::to_string_pretty(&output)?)
}
