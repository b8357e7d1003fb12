//! The sync engine: reconciles the local forest with a remote persisted
//! copy keyed by user identity.
//!
//! The core state machine lives in [`session`] and does no I/O of its own;
//! the two interchangeable transports ([`polling`] and [`subscription`])
//! drive it against the [`store`] seams. All timing is passed in explicitly
//! as `DateTime<Utc>` values, so tests control the clock.

pub mod auth;
pub mod polling;
pub mod session;
pub mod store;
pub mod subscription;

use chrono::Duration;
use serde::{Deserialize, Serialize};

pub use auth::{AuthService, StaticAuth};
pub use polling::PollingSync;
pub use session::{SessionPhase, SyncSession, WriteState};
pub use store::{blob_path, live_path, BlobStore, DirBlobStore, LiveStore, ObjectMetadata};
pub use subscription::LiveSync;

/// Timing knobs for the sync engine.
///
/// The skew tolerance deliberately exceeds the debounce window so the
/// polling transport does not react to this session's own just-completed
/// write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Quiet period after a local change before it is persisted.
    pub debounce_ms: u64,
    /// How often the polling transport checks remote metadata.
    pub poll_interval_ms: u64,
    /// Remote timestamps newer than the sync point by less than this are
    /// ignored.
    pub skew_tolerance_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 3000,
            poll_interval_ms: 10_000,
            skew_tolerance_ms: 3000,
        }
    }
}

impl SyncConfig {
    /// Debounce quiet period as a duration.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::milliseconds(i64::try_from(self.debounce_ms).unwrap_or(i64::MAX))
    }

    /// Poll interval as a duration.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::milliseconds(i64::try_from(self.poll_interval_ms).unwrap_or(i64::MAX))
    }

    /// Skew tolerance as a duration.
    #[must_use]
    pub fn skew_tolerance(&self) -> Duration {
        Duration::milliseconds(i64::try_from(self.skew_tolerance_ms).unwrap_or(i64::MAX))
    }
}
