//! Base64 (standard alphabet, padded) helpers.
//!
//! Every byte field crossing the wire goes through these two
//! functions; nothing else in the crate should call `base64::engine`
//! directly.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::{Error, Result};

/// Encodes `data` as standard, padded Base64.
pub fn b64_encode(data: impl AsRef<[u8]>) -> String {
    STANDARD.encode(data)
}

/// Decodes standard, padded Base64, mapping any failure to [`Error::FormatError`].
pub fn b64_decode(data: impl AsRef<[u8]>) -> Result<Vec<u8>> {
    STANDARD.decode(data).map_err(Error::from)
}
