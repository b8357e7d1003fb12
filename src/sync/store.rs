//! Remote store seams and the directory-backed implementation.
//!
//! Two store shapes are supported: a blob store addressed by
//! `{uid}/state.json` with timestamp metadata, and a live document store
//! addressed by `users/{uid}/appState` that re-delivers the full payload on
//! every change. [`DirBlobStore`] implements the blob shape on top of a
//! plain directory (a network share or synced folder), which is what the
//! CLI `sync` command runs against.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::TaskTreeError;

/// Out-of-band metadata for a stored blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// When the blob was last written.
    pub updated_at: DateTime<Utc>,
}

/// Path convention for the blob store.
#[must_use]
pub fn blob_path(uid: &str) -> String {
    format!("{uid}/state.json")
}

/// Path convention for the live document store.
#[must_use]
pub fn live_path(uid: &str) -> String {
    format!("users/{uid}/appState")
}

/// A blob store keyed by user identity.
///
/// Uploads are atomic whole-document replaces; there is no partial update.
#[cfg_attr(test, mockall::automock)]
pub trait BlobStore {
    /// Fetch the last-modified metadata for a blob.
    ///
    /// # Errors
    ///
    /// [`TaskTreeError::NotFound`] when nothing is stored at `path`;
    /// [`TaskTreeError::Transport`] for network or permission failures.
    fn metadata(&self, path: &str) -> Result<ObjectMetadata, TaskTreeError>;

    /// Download the full blob.
    ///
    /// # Errors
    ///
    /// Same as [`BlobStore::metadata`].
    fn download(&self, path: &str) -> Result<Vec<u8>, TaskTreeError>;

    /// Replace the blob wholesale, returning the new metadata.
    ///
    /// # Errors
    ///
    /// [`TaskTreeError::Transport`] for network or permission failures.
    fn upload(&self, path: &str, bytes: &[u8]) -> Result<ObjectMetadata, TaskTreeError>;
}

/// Cancels a live subscription when invoked.
pub type Unsubscribe = Box<dyn FnOnce()>;

/// A live-updating document store keyed by user identity.
///
/// Subscribing delivers the current document immediately (`Value::Null`
/// when none exists) and the full payload again on every subsequent change,
/// including changes caused by this session's own `set`.
pub trait LiveStore {
    /// Register a continuous listener on a document path.
    ///
    /// # Errors
    ///
    /// [`TaskTreeError::Transport`] when the listener cannot be registered.
    fn subscribe(
        &self,
        path: &str,
        on_change: Box<dyn FnMut(Value)>,
    ) -> Result<Unsubscribe, TaskTreeError>;

    /// Replace the document wholesale.
    ///
    /// # Errors
    ///
    /// [`TaskTreeError::Transport`] for network or permission failures.
    fn set(&self, path: &str, value: &Value) -> Result<(), TaskTreeError>;

    /// Delete the document (account-deletion cleanup).
    ///
    /// # Errors
    ///
    /// [`TaskTreeError::Transport`] for network or permission failures.
    fn remove(&self, path: &str) -> Result<(), TaskTreeError>;
}

/// Blob store backed by a local directory tree.
#[derive(Debug, Clone)]
pub struct DirBlobStore {
    root: PathBuf,
}

impl DirBlobStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// first upload.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn map_io(err: std::io::Error) -> TaskTreeError {
        if err.kind() == ErrorKind::NotFound {
            TaskTreeError::NotFound
        } else {
            TaskTreeError::Transport(err.to_string())
        }
    }

    fn modified_at(path: &Path) -> Result<ObjectMetadata, TaskTreeError> {
        let meta = fs::metadata(path).map_err(Self::map_io)?;
        let modified = meta.modified().map_err(Self::map_io)?;
        Ok(ObjectMetadata {
            updated_at: DateTime::<Utc>::from(modified),
        })
    }
}

impl BlobStore for DirBlobStore {
    fn metadata(&self, path: &str) -> Result<ObjectMetadata, TaskTreeError> {
        Self::modified_at(&self.resolve(path))
    }

    fn download(&self, path: &str) -> Result<Vec<u8>, TaskTreeError> {
        fs::read(self.resolve(path)).map_err(Self::map_io)
    }

    fn upload(&self, path: &str, bytes: &[u8]) -> Result<ObjectMetadata, TaskTreeError> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| TaskTreeError::Transport(e.to_string()))?;
        }
        fs::write(&full, bytes).map_err(|e| TaskTreeError::Transport(e.to_string()))?;
        Self::modified_at(&full)
    }
}
