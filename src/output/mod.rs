//! Output formatting for tasktree.
//!
//! This module provides formatters for displaying the task forest in
//! various formats.

mod json;
mod pretty;

use crate::cli::args::OutputFormat;
use crate::error::TaskTreeError;
use crate::tree::AppState;

pub use json::*;
pub use pretty::*;

/// Format the forest based on output format
///
/// # Errors
///
/// Returns `TaskTreeError::Parse` if JSON serialization fails.
pub fn format_state(state: &AppState, format: OutputFormat) -> Result<String, TaskTreeError> {
    match format {
        OutputFormat::Pretty => Ok(format_state_pretty(state)),
        OutputFormat::Json => format_state_json(state),
    }
}

/// Format a short status message based on output format
///
/// # Errors
///
/// Returns `TaskTreeError::Parse` if JSON serialization fails.
pub fn format_message(message: &str, format: OutputFormat) -> Result<String, TaskTreeError> {
    match format {
        OutputFormat::Pretty => Ok(message.to_string()),
        OutputFormat::Json => format_message_json(message),
    }
}
