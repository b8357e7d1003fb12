//! Push/pull polling transport against a blob store.
//!
//! Periodically compares the remote last-modified timestamp against the
//! session's sync point and only downloads the full payload when the remote
//! is newer by more than the skew tolerance. The tolerance exceeds the
//! debounce window, so the session does not react to its own just-completed
//! write.

use chrono::{DateTime, Utc};

use crate::error::TaskTreeError;
use crate::sync::auth::AuthService;
use crate::sync::session::{SessionPhase, SyncSession};
use crate::sync::store::{blob_path, BlobStore};
use crate::sync::SyncConfig;
use crate::tree::validate::{decode_app_state, encode_app_state};
use crate::tree::AppState;

/// Sync driver using the push/pull polling strategy.
pub struct PollingSync<A: AuthService, S: BlobStore> {
    auth: A,
    store: S,
    config: SyncConfig,
    session: SyncSession,
    path: Option<String>,
    last_poll: Option<DateTime<Utc>>,
}

impl<A: AuthService, S: BlobStore> PollingSync<A, S> {
    /// Create a signed-out driver.
    #[must_use]
    pub fn new(auth: A, store: S, config: SyncConfig) -> Self {
        let session = SyncSession::new(config.debounce());
        Self {
            auth,
            store,
            config,
            session,
            path: None,
            last_poll: None,
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

    /// Take the session from signed-out through loading to synced by
    /// fetching the remote state for the current identity.
    ///
    /// A missing remote document falls back to the seed forest without an
    /// immediate persist. Anything else that goes wrong tears the session
    /// down.
    ///
    /// # Errors
    ///
    /// Returns the error that caused a fatal teardown; the session is
    /// already back in `SignedOut` when this returns `Err`.
    pub fn sign_in(&mut self, now: DateTime<Utc>) -> Result<(), TaskTreeError> {
        let Some(uid) = self.auth.current_identity() else {
            return Err(self.fatal(TaskTreeError::AuthLost));
        };
        let path = blob_path(&uid);
        self.session.begin_loading();
        self.last_poll = Some(now);

        match self.store.metadata(&path) {
            Err(TaskTreeError::NotFound) => self.session.apply_seed(),
            Err(err) => return Err(self.fatal(err)),
            Ok(meta) => match self.fetch(&path) {
                // The blob vanished between metadata and download; treat it
                // like an empty remote.
                Err(TaskTreeError::NotFound) => self.session.apply_seed(),
                Err(err) => return Err(self.fatal(err)),
                Ok(state) => self.session.apply_remote(state, Some(meta.updated_at)),
            },
        }

        self.path = Some(path);
        Ok(())
    }

    /// One scheduler tick: poll the remote if the interval elapsed, then
    /// flush a debounced write if one is due.
    ///
    /// # Errors
    ///
    /// Returns the error that caused a fatal teardown.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<(), TaskTreeError> {
        if self.session.phase() == SessionPhase::SignedOut {
            return Ok(());
        }
        if self.auth.current_identity().is_none() {
            return Err(self.fatal(TaskTreeError::AuthLost));
        }

        self.poll_remote(now)?;
        self.flush(now, false)
    }

    /// Force any pending write out immediately, ignoring the quiet period.
    ///
    /// # Errors
    ///
    /// Returns the error that caused a fatal teardown.
    pub fn flush_pending(&mut self, now: DateTime<Utc>) -> Result<(), TaskTreeError> {
        self.flush(now, true)
    }

    /// Orderly sign-out: cancel the pending debounce and drop the listener
    /// state. Does not flush.
    pub fn sign_out(&mut self) {
        self.auth.sign_out();
        self.session.sign_out();
        self.path = None;
        self.last_poll = None;
    }

    fn poll_remote(&mut self, now: DateTime<Utc>) -> Result<(), TaskTreeError> {
        let due = self
            .last_poll
            .is_none_or(|last| now - last >= self.config.poll_interval());
        if !due {
            return Ok(());
        }
        self.last_poll = Some(now);

        let Some(path) = self.path.clone() else {
            return Ok(());
        };
        match self.store.metadata(&path) {
            // Remote disappeared mid-session: benign, local state stands
            // until the next write recreates it.
            Err(TaskTreeError::NotFound) => Ok(()),
            Err(err) => Err(self.fatal(err)),
            Ok(meta) => {
                if meta.updated_at - self.session.synced_at() <= self.config.skew_tolerance() {
                    return Ok(());
                }
                match self.fetch(&path) {
                    Err(TaskTreeError::NotFound) => Ok(()),
                    Err(err) => Err(self.fatal(err)),
                    Ok(state) => {
                        self.session.apply_remote(state, Some(meta.updated_at));
                        Ok(())
                    }
                }
            }
        }
    }

    fn flush(&mut self, now: DateTime<Utc>, force: bool) -> Result<(), TaskTreeError> {
        let due = if force {
            self.session.take_pending_write()
        } else {
            self.session.take_due_write(now)
        };
        let Some(state) = due else {
            return Ok(());
        };
        let Some(path) = self.path.clone() else {
            return Ok(());
        };

        let bytes = match encode_app_state(&state) {
            Ok(bytes) => bytes,
            Err(err) => return Err(self.fatal(err)),
        };
        match self.store.upload(&path, &bytes) {
            Ok(meta) => {
                self.session.confirm_write(Some(meta.updated_at));
                Ok(())
            }
            Err(err) => Err(self.fatal(err)),
        }
    }

    fn fetch(&self, path: &str) -> Result<AppState, TaskTreeError> {
        let bytes = self.store.download(path)?;
        decode_app_state(&bytes)
    }

    fn fatal(&mut self, err: TaskTreeError) -> TaskTreeError {
        self.auth.sign_out();
        self.session.fail(&err);
        self.path = None;
        self.last_poll = None;
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::auth::MockAuthService;
    use crate::sync::store::{MockBlobStore, ObjectMetadata};
    use crate::tree::{ops, seed};
    use chrono::TimeZone;

    fn t(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).single().unwrap()
    }

    fn signed_in_auth() -> MockAuthService {
        let mut auth = MockAuthService::new();
        auth.expect_current_identity()
            .returning(|| Some("uid-1".to_string()));
        auth.expect_sign_out().returning(|| ());
        auth
    }

    fn remote_bytes() -> Vec<u8> {
        let mut state = AppState::with_items(seed::seed_forest());
        state.dark_mode = true;
        encode_app_state(&state).unwrap()
    }

    #[test]
    fn test_fresh_identity_seeds_without_writing() {
        let mut store = MockBlobStore::new();
        store
            .expect_metadata()
            .returning(|_| Err(TaskTreeError::NotFound));
        store.expect_upload().never();

        let mut sync = PollingSync::new(signed_in_auth(), store, SyncConfig::default());
        sync.sign_in(t(0)).unwrap();

        assert_eq!(sync.session().phase(), SessionPhase::Synced);
        assert_eq!(sync.state().items, seed::seed_forest());

        // No writes are issued until the first local mutation.
        sync.tick(t(5)).unwrap();
        sync.tick(t(20)).unwrap();
    }

    #[test]
    fn test_first_mutation_persists_once_after_debounce() {
        let mut store = MockBlobStore::new();
        store
            .expect_metadata()
            .returning(|_| Err(TaskTreeError::NotFound));
        store
            .expect_upload()
            .withf(|path, bytes| {
                path == "uid-1/state.json"
                    && decode_app_state(bytes).unwrap().items.iter().any(|n| n.value == "ship it")
            })
            .times(1)
            .returning(|_, _| Ok(ObjectMetadata { updated_at: t(9) }));

        let mut sync = PollingSync::new(signed_in_auth(), store, SyncConfig::default());
        sync.sign_in(t(0)).unwrap();

        sync.mutate(t(1), |state| {
            ops::add_task(&mut state.items, None, "ship it").unwrap();
        });

        sync.tick(t(2)).unwrap(); // quiet period not over
        sync.tick(t(5)).unwrap(); // fires exactly once
        sync.tick(t(6)).unwrap();

        assert_eq!(sync.session().synced_at(), t(9));
        assert_eq!(sync.session().phase(), SessionPhase::Synced);
    }

    #[test]
    fn test_sign_in_applies_valid_remote_state() {
        let mut store = MockBlobStore::new();
        store
            .expect_metadata()
            .returning(|_| Ok(ObjectMetadata { updated_at: t(0) }));
        store.expect_download().returning(|_| Ok(remote_bytes()));
        store.expect_upload().never();

        let mut sync = PollingSync::new(signed_in_auth(), store, SyncConfig::default());
        sync.sign_in(t(1)).unwrap();

        assert!(sync.state().dark_mode);
        assert_eq!(sync.session().synced_at(), t(0));

        // The applied snapshot is flagged external: zero persist calls.
        sync.tick(t(60)).unwrap();
    }

    #[test]
    fn test_poll_skew_gate() {
        let mut store = MockBlobStore::new();
        store
            .expect_metadata()
            .times(1)
            .returning(|_| Ok(ObjectMetadata { updated_at: t(0) }));
        store.expect_download().times(1).returning(|_| Ok(remote_bytes()));

        let mut sync = PollingSync::new(signed_in_auth(), store, SyncConfig::default());
        sync.sign_in(t(0)).unwrap();

        // Remote newer by 2s: inside the tolerance, no download.
        let mut store = MockBlobStore::new();
        store
            .expect_metadata()
            .times(1)
            .returning(|_| Ok(ObjectMetadata { updated_at: t(2) }));
        store.expect_download().never();
        sync.store = store;
        sync.tick(t(10)).unwrap();

        // Remote newer by 5s: outside the tolerance, download and apply.
        let mut store = MockBlobStore::new();
        store
            .expect_metadata()
            .times(1)
            .returning(|_| Ok(ObjectMetadata { updated_at: t(5) }));
        store.expect_download().times(1).returning(|_| Ok(remote_bytes()));
        sync.store = store;
        sync.tick(t(20)).unwrap();

        assert_eq!(sync.session().synced_at(), t(5));
        assert!(sync.state().dark_mode);
    }

    #[test]
    fn test_poll_interval_gate() {
        let mut store = MockBlobStore::new();
        // One metadata call at sign-in; the tick at t(5) is inside the
        // 10s interval and must not poll again.
        store
            .expect_metadata()
            .times(1)
            .returning(|_| Err(TaskTreeError::NotFound));

        let mut sync = PollingSync::new(signed_in_auth(), store, SyncConfig::default());
        sync.sign_in(t(0)).unwrap();
        sync.tick(t(5)).unwrap();
    }

    #[test]
    fn test_transport_error_during_load_is_fatal() {
        let mut store = MockBlobStore::new();
        store
            .expect_metadata()
            .returning(|_| Err(TaskTreeError::Transport("permission denied".to_string())));

        let mut sync = PollingSync::new(signed_in_auth(), store, SyncConfig::default());
        let err = sync.sign_in(t(0)).unwrap_err();

        assert!(matches!(err, TaskTreeError::Transport(_)));
        assert_eq!(sync.session().phase(), SessionPhase::SignedOut);
        assert!(sync.state().items.is_empty());
        assert!(sync.session().message().unwrap().contains("permission denied"));
    }

    #[test]
    fn test_malformed_remote_payload_is_fatal() {
        let mut store = MockBlobStore::new();
        store
            .expect_metadata()
            .returning(|_| Ok(ObjectMetadata { updated_at: t(0) }));
        store
            .expect_download()
            .returning(|_| Ok(b"{\"items\": 42}".to_vec()));

        let mut sync = PollingSync::new(signed_in_auth(), store, SyncConfig::default());
        let err = sync.sign_in(t(0)).unwrap_err();

        assert!(matches!(err, TaskTreeError::Validation(_)));
        assert_eq!(sync.session().phase(), SessionPhase::SignedOut);
    }

    #[test]
    fn test_auth_loss_mid_session_is_fatal() {
        let mut auth = MockAuthService::new();
        let mut first = true;
        auth.expect_current_identity().returning(move || {
            if first {
                first = false;
                Some("uid-1".to_string())
            } else {
                None
            }
        });
        auth.expect_sign_out().returning(|| ());

        let mut store = MockBlobStore::new();
        store
            .expect_metadata()
            .returning(|_| Err(TaskTreeError::NotFound));

        let mut sync = PollingSync::new(auth, store, SyncConfig::default());
        sync.sign_in(t(0)).unwrap();

        let err = sync.tick(t(1)).unwrap_err();
        assert!(matches!(err, TaskTreeError::AuthLost));
        assert_eq!(sync.session().phase(), SessionPhase::SignedOut);
    }

    #[test]
    fn test_upload_failure_is_fatal() {
        let mut store = MockBlobStore::new();
        store
            .expect_metadata()
            .returning(|_| Err(TaskTreeError::NotFound));
        store
            .expect_upload()
            .returning(|_, _| Err(TaskTreeError::Transport("socket closed".to_string())));

        let mut sync = PollingSync::new(signed_in_auth(), store, SyncConfig::default());
        sync.sign_in(t(0)).unwrap();
        sync.mutate(t(1), |state| {
            state.hide_done_items = true;
        });

        let err = sync.tick(t(5)).unwrap_err();
        assert!(matches!(err, TaskTreeError::Transport(_)));
        assert_eq!(sync.session().phase(), SessionPhase::SignedOut);
    }

    #[test]
    fn test_forced_flush_writes_immediately() {
        let mut store = MockBlobStore::new();
        store
            .expect_metadata()
            .returning(|_| Err(TaskTreeError::NotFound));
        store
            .expect_upload()
            .times(1)
            .returning(|_, _| Ok(ObjectMetadata { updated_at: t(1) }));

        let mut sync = PollingSync::new(signed_in_auth(), store, SyncConfig::default());
        sync.sign_in(t(0)).unwrap();
        sync.mutate(t(1), |state| {
            state.dark_mode = true;
        });

        sync.flush_pending(t(1)).unwrap();
        assert_eq!(sync.session().synced_at(), t(1));
    }
}
