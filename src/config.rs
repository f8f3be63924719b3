//! Tunable parameters for handshakes, sessions and file transfer.
//!
//! Every value here has a default matching this protocol's pinned constants;
//! callers embedding this crate in a server or client override only what
//! their deployment actually needs to differ on.

use std::time::Duration;

/// Which key-schedule variant derives `K_enc`/`K_mac` from the session secret.
///
/// `Hmac` is the default wire behavior (grounded
/// on the exercised Python client, `tests/client_http.py`). `Hkdf` is kept
/// as an explicit opt-in for deployments that have standardized on
/// HKDF-SHA256 elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeySchedule {
    /// `K_enc = HMAC-SHA256(KS, "enc")`, `K_mac = HMAC-SHA256(KS, "mac")`.
    #[default]
    Hmac,
    /// HKDF-SHA256 with an empty salt and the info string
    /// `"encryption and mac"`, producing 64 bytes split as `K_enc || K_mac`.
    Hkdf,
}

/// Runtime configuration shared by the handshake, session and file layers.
#[derive(Debug, Clone)]
pub struct Config {
    /// Key-derivation variant. Default: [`KeySchedule::Hmac`].
    pub key_schedule: KeySchedule,
    /// Maximum age a session frame's embedded timestamp may have before
    /// it's rejected as stale, independent of replay tracking.
    pub freshness: Duration,
    /// Client-side timeout waiting on `/handshake/finalize`'s response.
    pub finalize_timeout: Duration,
    /// Client-side timeout waiting on a `/session/test` response.
    pub frame_timeout: Duration,
    /// Chunk size used by [`crate::file::FileEncryptor`] when streaming
    /// a file through AES-CBC and the running HMAC.
    pub file_chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_schedule: KeySchedule::default(),
            freshness: Duration::from_secs(5 * 60),
            finalize_timeout: Duration::from_secs(5),
            frame_timeout: Duration::from_secs(30),
            file_chunk_size: 100 * 1024 * 1024,
        }
    }
}
