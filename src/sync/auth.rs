//! The auth service seam.
//!
//! The identity provider itself is an external collaborator; the sync
//! engine only needs a signed user identity or none. Loss of identity
//! mid-session is treated like any other fatal error path.

use std::cell::RefCell;

/// An opaque identity provider.
#[cfg_attr(test, mockall::automock)]
pub trait AuthService {
    /// The current signed-in identity, if any.
    fn current_identity(&self) -> Option<String>;

    /// Drop the current identity.
    fn sign_out(&self);
}

/// Auth backed by a fixed identity, for the CLI and tests.
///
/// The identity usually comes from configuration or the `TASKTREE_USER`
/// environment variable.
#[derive(Debug, Default)]
pub struct StaticAuth {
    identity: RefCell<Option<String>>,
}

impl StaticAuth {
    /// Create an auth service with the given identity (or none).
    #[must_use]
    pub fn new(identity: Option<String>) -> Self {
        Self {
            identity: RefCell::new(identity),
        }
    }

    /// Create a signed-in auth service.
    #[must_use]
    pub fn signed_in(identity: impl Into<String>) -> Self {
        Self::new(Some(identity.into()))
    }
}

impl AuthService for StaticAuth {
    fn current_identity(&self) -> Option<String> {
        self.identity.borrow().clone()
    }

    fn sign_out(&self) {
        self.identity.borrow_mut().take();
    }
}
