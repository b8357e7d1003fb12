//! The per-session sync state machine.
//!
//! Debounce and echo suppression interact through one authoritative
//! [`WriteState`] rather than independently mutated flag and timer fields.
//! Applying a remote snapshot parks the machine in
//! [`WriteState::ApplyingRemote`]; the next flush consumes that back to
//! idle without persisting anything, which is what breaks the
//! write/notify/write feedback loop. Only changes that originated from
//! local interaction ever become dirty state, and only the settled state
//! after the quiet period is offered for persist.
//!
//! This type does no I/O. Transports own the session and call
//! [`SyncSession::take_due_write`] when their timer fires.

use chrono::{DateTime, Duration, Utc};

use crate::error::TaskTreeError;
use crate::tree::{seed, AppState};

/// Lifecycle of an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No identity, or torn down after a fatal error.
    SignedOut,
    /// Fetching the remote state after sign-in.
    Loading,
    /// Local and remote agree as far as this session knows.
    Synced,
    /// A persist is in flight.
    Saving,
}

/// The single authoritative write coordination state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteState {
    /// Nothing to persist.
    Idle,
    /// A local change is waiting out the quiet period.
    LocalDirty {
        /// When the most recent change in the burst arrived.
        since: DateTime<Utc>,
    },
    /// The last state update came from the remote; the next flush must be
    /// suppressed.
    ApplyingRemote,
}

/// Sync state for one authenticated session.
#[derive(Debug)]
pub struct SyncSession {
    phase: SessionPhase,
    state: AppState,
    write_state: WriteState,
    synced_at: DateTime<Utc>,
    message: Option<String>,
    debounce: Duration,
}

impl SyncSession {
    /// Create a signed-out session with the given debounce quiet period.
    #[must_use]
    pub fn new(debounce: Duration) -> Self {
        Self {
            phase: SessionPhase::SignedOut,
            state: AppState::default(),
            write_state: WriteState::Idle,
            synced_at: DateTime::<Utc>::MIN_UTC,
            message: None,
            debounce,
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Current write coordination state.
    #[must_use]
    pub const fn write_state(&self) -> WriteState {
        self.write_state
    }

    /// The local app state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Mutable access to the local app state.
    ///
    /// Callers must follow every mutation with [`SyncSession::note_local_change`]
    /// so the debounce timer observes it.
    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Timestamp of the last known-good sync point.
    #[must_use]
    pub const fn synced_at(&self) -> DateTime<Utc> {
        self.synced_at
    }

    /// The user-visible message left behind by a fatal teardown, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Enter the loading phase after sign-in.
    pub fn begin_loading(&mut self) {
        self.phase = SessionPhase::Loading;
        self.message = None;
    }

    /// Apply a snapshot that arrived from the remote.
    ///
    /// The state is flagged as externally sourced *before* it lands, so the
    /// flush that follows skips the write instead of echoing it back.
    pub fn apply_remote(&mut self, state: AppState, updated_at: Option<DateTime<Utc>>) {
        self.state = state;
        self.write_state = WriteState::ApplyingRemote;
        if let Some(updated_at) = updated_at {
            self.synced_at = updated_at;
        }
        self.phase = SessionPhase::Synced;
    }

    /// Fall back to the built-in seed forest (remote had nothing stored).
    ///
    /// Deliberately does not schedule a persist: the fetch may merely have
    /// raced against a remote copy this session has not seen yet.
    pub fn apply_seed(&mut self) {
        self.state = AppState::with_items(seed::seed_forest());
        self.write_state = WriteState::Idle;
        self.phase = SessionPhase::Synced;
    }

    /// Record that a local mutation just happened.
    ///
    /// Restarts the quiet period, so a burst of edits settles into a single
    /// persist of the final state.
    pub fn note_local_change(&mut self, now: DateTime<Utc>) {
        if self.phase == SessionPhase::SignedOut {
            return;
        }
        self.write_state = WriteState::LocalDirty { since: now };
    }

    /// The debounced flush handler.
    ///
    /// Returns the state to persist when a local change has waited out the
    /// quiet period. A pending [`WriteState::ApplyingRemote`] is consumed
    /// here and yields nothing, since the data already matches remote. When
    /// this
    /// returns `Some`, the caller must finish with
    /// [`SyncSession::confirm_write`] or tear the session down via
    /// [`SyncSession::fail`].
    pub fn take_due_write(&mut self, now: DateTime<Utc>) -> Option<AppState> {
        match self.write_state {
            WriteState::ApplyingRemote => {
                self.write_state = WriteState::Idle;
                None
            }
            WriteState::LocalDirty { since } if now - since >= self.debounce => {
                self.write_state = WriteState::Idle;
                self.phase = SessionPhase::Saving;
                Some(self.state.clone())
            }
            WriteState::LocalDirty { .. } | WriteState::Idle => None,
        }
    }

    /// Like [`SyncSession::take_due_write`] but ignores the quiet period.
    ///
    /// Used when a session ends with a write still pending.
    pub fn take_pending_write(&mut self) -> Option<AppState> {
        match self.write_state {
            WriteState::LocalDirty { .. } => {
                self.write_state = WriteState::Idle;
                self.phase = SessionPhase::Saving;
                Some(self.state.clone())
            }
            WriteState::ApplyingRemote => {
                self.write_state = WriteState::Idle;
                None
            }
            WriteState::Idle => None,
        }
    }

    /// A persist completed; advance the sync point.
    pub fn confirm_write(&mut self, updated_at: Option<DateTime<Utc>>) {
        if let Some(updated_at) = updated_at {
            self.synced_at = updated_at;
        }
        self.phase = SessionPhase::Synced;
    }

    /// Session-fatal teardown: surface a message, clear local state, and
    /// force sign-out. Partial sync state is never left in place.
    pub fn fail(&mut self, err: &TaskTreeError) {
        self.message = Some(format!("signed out: {err}"));
        self.clear();
    }

    /// Orderly sign-out. Pending writes are dropped; callers that want them
    /// flushed do so before calling this.
    pub fn sign_out(&mut self) {
        self.message = None;
        self.clear();
    }

    fn clear(&mut self) {
        self.state = AppState::default();
        self.write_state = WriteState::Idle;
        self.synced_at = DateTime::<Utc>::MIN_UTC;
        self.phase = SessionPhase::SignedOut;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ops;
    use chrono::TimeZone;

    fn t(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).single().unwrap()
    }

    fn synced_session() -> SyncSession {
        let mut session = SyncSession::new(Duration::seconds(3));
        session.begin_loading();
        session.apply_seed();
        session
    }

    #[test]
    fn test_seed_fallback_schedules_no_write() {
        let mut session = synced_session();
        assert_eq!(session.phase(), SessionPhase::Synced);
        assert!(session.take_due_write(t(100)).is_none());
    }

    #[test]
    fn test_burst_of_edits_yields_one_settled_write() {
        let mut session = synced_session();

        for i in 0..5 {
            ops::add_task(&mut session.state_mut().items, None, "edit").unwrap();
            session.note_local_change(t(i));
        }

        // Quiet period restarts with each edit: nothing due yet.
        assert!(session.take_due_write(t(5)).is_none());
        assert!(session.take_due_write(t(6)).is_none());

        let written = session.take_due_write(t(7)).unwrap();
        assert_eq!(session.phase(), SessionPhase::Saving);
        assert_eq!(&written, session.state());

        session.confirm_write(Some(t(7)));
        assert_eq!(session.phase(), SessionPhase::Synced);
        assert_eq!(session.synced_at(), t(7));

        // Settled: nothing further to persist.
        assert!(session.take_due_write(t(60)).is_none());
    }

    #[test]
    fn test_remote_snapshot_is_never_echoed_back() {
        let mut session = synced_session();
        let remote = AppState::with_items(seed::seed_forest());

        session.apply_remote(remote, Some(t(10)));
        assert_eq!(session.synced_at(), t(10));
        assert_eq!(session.write_state(), WriteState::ApplyingRemote);

        // The flush consumes the flag and skips the write.
        assert!(session.take_due_write(t(60)).is_none());
        assert_eq!(session.write_state(), WriteState::Idle);
        assert!(session.take_due_write(t(120)).is_none());
    }

    #[test]
    fn test_local_edit_after_remote_apply_still_persists() {
        let mut session = synced_session();
        session.apply_remote(AppState::with_items(seed::seed_forest()), Some(t(10)));

        ops::add_task(&mut session.state_mut().items, None, "mine").unwrap();
        session.note_local_change(t(11));

        assert!(session.take_due_write(t(15)).is_some());
    }

    #[test]
    fn test_forced_flush_ignores_quiet_period() {
        let mut session = synced_session();
        session.note_local_change(t(0));

        assert!(session.take_due_write(t(1)).is_none());
        assert!(session.take_pending_write().is_some());
        assert!(session.take_pending_write().is_none());
    }

    #[test]
    fn test_fatal_teardown_clears_everything() {
        let mut session = synced_session();
        session.note_local_change(t(0));

        session.fail(&TaskTreeError::Transport("connection reset".to_string()));

        assert_eq!(session.phase(), SessionPhase::SignedOut);
        assert!(session.state().items.is_empty());
        assert!(session.take_due_write(t(100)).is_none());
        assert!(session.message().unwrap().contains("connection reset"));
    }

    #[test]
    fn test_mutations_while_signed_out_are_ignored() {
        let mut session = SyncSession::new(Duration::seconds(3));
        session.note_local_change(t(0));
        assert_eq!(session.write_state(), WriteState::Idle);
    }
}
