//! Push/subscribe transport against a live document store.
//!
//! The store re-delivers the full payload on every remote change, including
//! ones caused by this session's own write, so there is no timestamp
//! comparison here at all: every delivery is validated, repaired, applied,
//! and flagged as externally sourced, and the echo-suppression state alone
//! prevents loop-back writes.
//!
//! Deliveries land in an inbox that [`LiveSync::pump`] drains on the event
//! loop, keeping the callback free of session borrows.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::TaskTreeError;
use crate::sync::auth::AuthService;
use crate::sync::session::{SessionPhase, SyncSession};
use crate::sync::store::{live_path, LiveStore, Unsubscribe};
use crate::sync::SyncConfig;
use crate::tree::validate::{is_valid_app_state, repair_children};
use crate::tree::AppState;

/// Sync driver using the push/subscribe strategy.
pub struct LiveSync<A: AuthService, S: LiveStore> {
    auth: A,
    store: S,
    session: SyncSession,
    inbox: Rc<RefCell<VecDeque<Value>>>,
    unsubscribe: Option<Unsubscribe>,
    path: Option<String>,
}

impl<A: AuthService, S: LiveStore> LiveSync<A, S> {
    /// Create a signed-out driver.
    #[must_use]
    pub fn new(auth: A, store: S, config: &SyncConfig) -> Self {
        Self {
            auth,
            store,
            session: SyncSession::new(config.debounce()),
            inbox: Rc::new(RefCell::new(VecDeque::new())),
            unsubscribe: None,
            path: None,
        }
    }

    /// The underlying session (phase, state, message).
    #[must_use]
    pub const fn session(&self) -> &SyncSession {
        &self.session
    }

    /// The local app state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        self.session.state()
    }

    /// Mutate local state and restart the debounce quiet period.
    pub fn mutate<F: FnOnce(&mut AppState)>(&mut self, now: DateTime<Utc>, mutation: F) {
        mutation(self.session.state_mut());
        self.session.note_local_change(now);
    }

    /// Register the listener for the current identity and enter the loading
    /// phase. The initial snapshot arrives through the inbox; call
    /// [`LiveSync::pump`] to apply it.
    ///
    /// # Errors
    ///
    /// Returns the error that caused a fatal teardown.
    pub fn sign_in(&mut self) -> Result<(), TaskTreeError> {
        let Some(uid) = self.auth.current_identity() else {
            return Err(self.fatal(TaskTreeError::AuthLost));
        };
        let path = live_path(&uid);
        self.session.begin_loading();

        let inbox = Rc::clone(&self.inbox);
        let on_change = Box::new(move |payload: Value| {
            inbox.borrow_mut().push_back(payload);
        });
        match self.store.subscribe(&path, on_change) {
            Ok(unsubscribe) => {
                self.unsubscribe = Some(unsubscribe);
                self.path = Some(path);
                Ok(())
            }
            Err(err) => Err(self.fatal(err)),
        }
    }

    /// Drain delivered payloads and apply them, then flush a debounced
    /// write if one is due.
    ///
    /// # Errors
    ///
    /// Returns the error that caused a fatal teardown.
    pub fn pump(&mut self, now: DateTime<Utc>) -> Result<(), TaskTreeError> {
        if self.session.phase() == SessionPhase::SignedOut {
            return Ok(());
        }
        if self.auth.current_identity().is_none() {
            return Err(self.fatal(TaskTreeError::AuthLost));
        }

        loop {
            let payload = self.inbox.borrow_mut().pop_front();
            let Some(payload) = payload else { break };
            self.apply_delivery(payload)?;
        }
        self.flush(now)
    }

    /// Orderly teardown: cancel the listener and drop any pending write.
    pub fn close(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
        self.inbox.borrow_mut().clear();
        self.auth.sign_out();
        self.session.sign_out();
        self.path = None;
    }

    /// Account-deletion cleanup: remove the remote document, then tear the
    /// session down.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTreeError::Transport`] if the remove fails; the
    /// session is torn down either way.
    pub fn delete_account(&mut self) -> Result<(), TaskTreeError> {
        let result = match &self.path {
            Some(path) => self.store.remove(path),
            None => Ok(()),
        };
        self.close();
        result
    }

    fn apply_delivery(&mut self, mut payload: Value) -> Result<(), TaskTreeError> {
        if payload.is_null() {
            // No document stored yet. On first load fall back to the seed
            // forest; a mid-session null (remote removal) leaves local
            // state standing.
            if self.session.phase() == SessionPhase::Loading {
                self.session.apply_seed();
            }
            return Ok(());
        }

        repair_children(&mut payload);
        if !is_valid_app_state(&payload) {
            return Err(self.fatal(TaskTreeError::Validation(
                "remote document does not have the expected shape".to_string(),
            )));
        }
        match serde_json::from_value::<AppState>(payload) {
            Ok(state) => {
                self.session.apply_remote(state, None);
                Ok(())
            }
            Err(err) => Err(self.fatal(TaskTreeError::Parse(err))),
        }
    }

    fn flush(&mut self, now: DateTime<Utc>) -> Result<(), TaskTreeError> {
        let Some(state) = self.session.take_due_write(now) else {
            return Ok(());
        };
        let Some(path) = self.path.clone() else {
            return Ok(());
        };

        let value = match serde_json::to_value(&state) {
            Ok(value) => value,
            Err(err) => return Err(self.fatal(TaskTreeError::Parse(err))),
        };
        if !is_valid_app_state(&value) {
            return Err(self.fatal(TaskTreeError::Validation(
                "refusing to persist a malformed state".to_string(),
            )));
        }
        match self.store.set(&path, &value) {
            Ok(()) => {
                self.session.confirm_write(None);
                Ok(())
            }
            Err(err) => Err(self.fatal(err)),
        }
    }

    fn fatal(&mut self, err: TaskTreeError) -> TaskTreeError {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
        self.inbox.borrow_mut().clear();
        self.auth.sign_out();
        self.session.fail(&err);
        self.path = None;
        err
    }
}
