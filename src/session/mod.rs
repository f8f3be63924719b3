//! Authenticated, replay-protected session frames.

mod replay;

pub use replay::{InMemoryReplayGuard, ReplayGuard};

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::config::KeySchedule;
use crate::keys::SessionKeys;
use crate::primitives::{
    b64_decode, b64_encode, decrypt_padded, hmac_sha256, random_array, sign, verify_hmac_sha256,
    CbcEncryptor,
};
use crate::{Error, Result};

const NONCE_LEN: usize = 16;
const TIMESTAMP_LEN: usize = 8;
const IV_LEN: usize = 16;
const TAG_LEN: usize = 32;

/// An established secure channel: the client id the server knows us by,
/// the derived symmetric keys, and the client's ECDSA signing key.
///
/// Zeroizes `keys` on drop; the signing key zeroizes itself independently.
pub struct Session {
    client_id: String,
    keys: SessionKeys,
    signing: sign::EcdsaKeypair,
}

impl Session {
    /// Derives `SessionKeys` from `ks` and bundles them with the
    /// client's signing key into an established session.
    pub(crate) fn establish(
        client_id: String,
        ks: &[u8],
        signing: sign::EcdsaKeypair,
        schedule: KeySchedule,
    ) -> Result<Self> {
        let keys = SessionKeys::derive(ks, schedule)?;
        Ok(Self {
            client_id,
            keys,
            signing,
        })
    }

    /// The opaque client id assigned by the server during handshake.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The session's AES key. Exposed for test assertions; callers
    /// should otherwise only use [`Session::seal`]/[`Session::open`].
    pub fn k_enc(&self) -> &[u8; 32] {
        &self.keys.k_enc
    }

    /// The session's HMAC key. Needed alongside [`Session::k_enc`] by
    /// callers driving the file-AE path directly (outside `seal`/`open`).
    pub fn k_mac(&self) -> &[u8; 32] {
        &self.keys.k_mac
    }

    /// Builds an authenticated frame carrying `payload`, returning the
    /// Base64 `encrypted_message` and `client_signature` wire fields.
    pub fn seal(&self, payload: &[u8]) -> Result<(String, String)> {
        self.seal_with_nonce(payload, random_array())
    }

    fn seal_with_nonce(&self, payload: &[u8], nonce: [u8; NONCE_LEN]) -> Result<(String, String)> {
        let timestamp = now_millis();

        let mut plaintext = Vec::with_capacity(TIMESTAMP_LEN + NONCE_LEN + payload.len());
        plaintext.extend_from_slice(&timestamp.to_be_bytes());
        plaintext.extend_from_slice(&nonce);
        plaintext.extend_from_slice(payload);

        let iv: [u8; IV_LEN] = random_array();
        let mut encryptor = CbcEncryptor::new(&self.keys.k_enc, &iv)?;
        let mut ciphertext = encryptor.update(&plaintext);
        ciphertext.extend(encryptor.finish());

        let mut to_tag = Vec::with_capacity(iv.len() + ciphertext.len());
        to_tag.extend_from_slice(&iv);
        to_tag.extend_from_slice(&ciphertext);
        let tag = hmac_sha256(&self.keys.k_mac, &to_tag);

        let mut package = to_tag;
        package.extend_from_slice(&tag);

        let signature = self.signing.sign(&package);

        Ok((b64_encode(&package), b64_encode(&signature)))
    }

    /// Verifies and decrypts a frame produced by [`Session::seal`] on the
    /// peer side, using `peer_signing_key_der` to check `client_signature`
    /// and `guard` to reject replays of `(client_id, frame_nonce)`.
    ///
    /// Freshness and replay checks use `freshness` as the acceptable
    /// clock-skew window around the frame's embedded timestamp.
    pub fn open(
        &self,
        encrypted_message: &str,
        client_signature: &str,
        peer_signing_key_der: &[u8],
        guard: &dyn ReplayGuard,
        freshness: Duration,
    ) -> Result<Vec<u8>> {
        let package = b64_decode(encrypted_message)?;
        let signature = b64_decode(client_signature)?;

        // Signature first: reject frames not actually from the claimed peer
        // before spending effort decrypting them.
        sign::verify(peer_signing_key_der, &package, &signature)?;

        if package.len() < IV_LEN + TAG_LEN {
            return Err(Error::FormatError);
        }
        let (framed, tag) = package.split_at(package.len() - TAG_LEN);
        verify_hmac_sha256(&self.keys.k_mac, framed, tag)?;

        let (iv, ciphertext) = framed.split_at(IV_LEN);
        let plaintext = decrypt_padded(&self.keys.k_enc, iv, ciphertext)?;

        if plaintext.len() < TIMESTAMP_LEN + NONCE_LEN {
            return Err(Error::FormatError);
        }
        let (timestamp_bytes, rest) = plaintext.split_at(TIMESTAMP_LEN);
        let (nonce, payload) = rest.split_at(NONCE_LEN);

        let timestamp = u64::from_be_bytes(timestamp_bytes.try_into().expect("8-byte slice"));
        check_freshness(timestamp, freshness)?;

        guard.check_and_record(&self.client_id, nonce)?;

        Ok(payload.to_vec())
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is after the Unix epoch")
        .as_millis() as u64
}

fn check_freshness(timestamp_ms: u64, freshness: Duration) -> Result<()> {
    let now = now_millis();
    let delta = now.abs_diff(timestamp_ms);
    if delta > freshness.as_millis() as u64 {
        return Err(Error::IntegrityFailure);
    }
    Ok(())
}
