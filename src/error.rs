//! Error types for tasktree.
//!
//! Sync errors fall into two camps: a benign "nothing stored yet"
//! ([`TaskTreeError::NotFound`]), which callers recover from by falling back
//! to the seed forest, and everything else, which is session-fatal and forces
//! a sign-out.

use thiserror::Error;

/// Errors that can occur in tasktree.
#[derive(Debug, Error)]
pub enum TaskTreeError {
    /// A payload failed the structural shape check. Never partially accepted.
    #[error("invalid app state: {0}")]
    Validation(String),

    /// The remote has no stored state for this identity.
    #[error("no remote state found")]
    NotFound,

    /// Network or permission failure while talking to the remote store.
    #[error("transport error: {0}")]
    Transport(String),

    /// The signed-in identity disappeared mid-session.
    #[error("user identity is no longer available")]
    AuthLost,

    /// JSON encoding or decoding failed.
    #[error("failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Local file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TaskTreeError {
    /// Whether this error tears down the sync session.
    ///
    /// Only [`TaskTreeError::NotFound`] is recoverable; every other kind
    /// escalates to the forced sign-out path.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::NotFound)
    }
}
