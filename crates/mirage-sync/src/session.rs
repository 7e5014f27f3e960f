//! Per-connection sync session state.

use std::time::{Duration, Instant};

/// One run of the sync sequence for one client.
///
/// Carries only the full/partial flag and a start time for diagnostics;
/// dropped once the sequence completes.
#[derive(Clone, Copy, Debug)]
pub struct SyncSession {
    full_sync: bool,
    started: Instant,
}

impl SyncSession {
    /// Starts a session now.
    pub fn new(full_sync: bool) -> Self {
        Self {
            full_sync,
            started: Instant::now(),
        }
    }

    /// Returns `true` for a full sync, `false` for a partial refresh.
    pub fn is_full(&self) -> bool {
        self.full_sync
    }

    /// Time since the session started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
