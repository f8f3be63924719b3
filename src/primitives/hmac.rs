//! HMAC-SHA256 tagging, constant-time verification, and a streaming
//! variant for the file-AE chunked MAC.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Computes an HMAC-SHA256 tag over `data` under `key`.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Verifies an HMAC-SHA256 tag in constant time.
///
/// Uses `hmac::Mac::verify_slice`, which compares digests without
/// short-circuiting on the first differing byte.
pub fn verify_hmac_sha256(key: &[u8], data: &[u8], tag: &[u8]) -> Result<()> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.verify_slice(tag).map_err(|_| Error::IntegrityFailure)
}

/// An incremental HMAC-SHA256 computation, fed one ciphertext chunk at a
/// time as a file streams through [`crate::file::FileEncryptor`].
pub struct HmacStream {
    mac: HmacSha256,
}

impl HmacStream {
    /// Starts a new streaming MAC under `key`.
    pub fn new(key: &[u8]) -> Self {
        Self {
            mac: HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length"),
        }
    }

    /// Folds another chunk of ciphertext into the running MAC.
    pub fn update(&mut self, chunk: &[u8]) {
        self.mac.update(chunk);
    }

    /// Finalizes the MAC, consuming the stream.
    pub fn finish(self) -> [u8; 32] {
        self.mac.finalize().into_bytes().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_genuine_tag_and_rejects_tampered_one() {
        let key = b"session-mac-key";
        let data = b"some frame bytes";
        let tag = hmac_sha256(key, data);

        assert!(verify_hmac_sha256(key, data, &tag).is_ok());

        let mut bad_tag = tag;
        bad_tag[0] ^= 0xFF;
        assert!(verify_hmac_sha256(key, data, &bad_tag).is_err());
    }

    #[test]
    fn streaming_mac_matches_one_shot() {
        let key = b"file-mac-key";
        let chunk_a = vec![1u8; 37];
        let chunk_b = vec![2u8; 91];

        let mut all = chunk_a.clone();
        all.extend_from_slice(&chunk_b);
        let expected = hmac_sha256(key, &all);

        let mut stream = HmacStream::new(key);
        stream.update(&chunk_a);
        stream.update(&chunk_b);
        assert_eq!(stream.finish(), expected);
    }
}
