//! Replay tracking for accepted session frames.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::{Error, Result};

/// Tracks `(client_id, frame_nonce)` pairs already accepted, rejecting
/// repeats.
///
/// Implemented here as an in-memory, mutex-guarded set suitable for a
/// single process; a server fronting multiple processes or surviving
/// restarts should back this with shared storage instead (Redis, a
/// database table, …) — `ReplayGuard` is a trait specifically so that
/// swap is a drop-in replacement.
pub trait ReplayGuard: Send + Sync {
    /// Records `(client_id, nonce)` if unseen, or returns
    /// [`Error::ReplayDetected`] if it has already been accepted.
    fn check_and_record(&self, client_id: &str, nonce: &[u8]) -> Result<()>;
}

/// The default [`ReplayGuard`]: an in-memory set, cleared only by process
/// restart. Fine for tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryReplayGuard {
    seen: Mutex<HashSet<(String, Vec<u8>)>>,
}

impl ReplayGuard for InMemoryReplayGuard {
    fn check_and_record(&self, client_id: &str, nonce: &[u8]) -> Result<()> {
        let mut seen = self.seen.lock().expect("replay guard mutex poisoned");
        let key = (client_id.to_string(), nonce.to_vec());

        if !seen.insert(key) {
            tracing::debug!("rejecting replayed frame for client `{client_id}`");
            return Err(Error::ReplayDetected);
        }

        Ok(())
    }
}
