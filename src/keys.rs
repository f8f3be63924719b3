//! Derivation of the per-session symmetric keys from the shared secret `KS`.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use crate::config::KeySchedule;
use crate::primitives::hmac_sha256;
use crate::{Error, Result};

/// The length in bytes of the session secret `KS` exchanged during handshake finalize.
pub const SESSION_SECRET_LEN: usize = 32;

/// `K_enc` and `K_mac`, each 32 bytes, derived from `KS` per the
/// configured [`KeySchedule`]. Zeroized on drop.
#[derive(ZeroizeOnDrop)]
pub struct SessionKeys {
    /// Key for AES-256-CBC frame and file encryption.
    pub k_enc: [u8; 32],
    /// Key for HMAC-SHA256 frame and file authentication.
    pub k_mac: [u8; 32],
}

impl SessionKeys {
    /// Derives `K_enc`/`K_mac` from `ks` under the given schedule.
    pub fn derive(ks: &[u8], schedule: KeySchedule) -> Result<Self> {
        if ks.len() != SESSION_SECRET_LEN {
            return Err(Error::ProtocolViolation);
        }

        match schedule {
            KeySchedule::Hmac => Ok(Self {
                k_enc: hmac_sha256(ks, b"enc"),
                k_mac: hmac_sha256(ks, b"mac"),
            }),
            KeySchedule::Hkdf => {
                let hk = Hkdf::<Sha256>::new(None, ks);
                let mut okm = [0u8; 64];
                hk.expand(b"encryption and mac", &mut okm)
                    .map_err(|_| Error::ProtocolViolation)?;

                let mut k_enc = [0u8; 32];
                let mut k_mac = [0u8; 32];
                k_enc.copy_from_slice(&okm[..32]);
                k_mac.copy_from_slice(&okm[32..]);

                Ok(Self { k_enc, k_mac })
            }
        }
    }
}
