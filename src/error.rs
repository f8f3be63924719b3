//! Collection of error handling types and aliases.

use thiserror::Error;

/// The error types that can occur when establishing or using a secure channel.
///
/// Variant names follow the taxonomy of the protocol this crate implements:
/// callers should match on these to decide whether to retry, surface a
/// credential prompt, or back off, never on the formatted message.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// A signature, DER decode, or OAEP decryption failed during the
    /// handshake. Fatal for the handshake in progress: the caller MUST
    /// start over with freshly generated keys and nonces.
    #[error("handshake protocol violation")]
    ProtocolViolation,

    /// The peer reported (or we locally detected) reuse of a
    /// `(client_id, nonce)` pair. Never retry the same frame or nonce.
    #[error("nonce or frame replay detected")]
    ReplayDetected,

    /// The peer rejected our credentials (HTTP 401/403).
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The peer asked us to back off (HTTP 429).
    #[error("rate limited")]
    RateLimited,

    /// A transport-level failure: I/O, timeout, or an HTTP status this
    /// crate doesn't give a dedicated meaning to.
    #[error("transport error: {0}")]
    TransportError(String),

    /// MAC verification failed on an inbound frame or file blob, or a
    /// frame's timestamp fell outside the freshness window. Deliberately
    /// indistinguishable from a padding failure — see [`Error::FormatError`].
    #[error("integrity check failed")]
    IntegrityFailure,

    /// Base64, JSON, DER, or padding decoding failed on peer-supplied
    /// data. Handled identically to [`Error::IntegrityFailure`] so a
    /// peer cannot distinguish "bad format" from "bad MAC" from timing
    /// or error content.
    #[error("malformed input")]
    FormatError,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::TransportError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(_: serde_json::Error) -> Self {
        Error::FormatError
    }
}

impl From<base64::DecodeError> for Error {
    fn from(_: base64::DecodeError) -> Self {
        Error::FormatError
    }
}

/// A handy [`std::result::Result`] type alias bounding the [`enum@Error`] struct as `E`.
pub type Result<T, E = Error> = std::result::Result<T, E>;
