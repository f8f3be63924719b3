//! RSA-3072 with OAEP-SHA256 (MGF1 hash = label hash = SHA-256, empty label).

use rsa::pkcs8::{DecodePublicKey, EncodePublicKey};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::{Error, Result};

const KEY_BITS: usize = 3072;

fn oaep() -> Oaep {
    Oaep::new::<Sha256>()
}

/// An ephemeral RSA-3072 encryption keypair, generated fresh for a single
/// handshake. `rsa`'s private key type zeroizes its limbs on drop.
pub struct RsaKeypair {
    private: RsaPrivateKey,
    public: RsaPublicKey,
}

impl RsaKeypair {
    /// Generates a fresh RSA-3072 keypair from the OS RNG.
    pub fn generate() -> Result<Self> {
        let private =
            RsaPrivateKey::new(&mut rand::rngs::OsRng, KEY_BITS).map_err(|_| Error::ProtocolViolation)?;
        let public = RsaPublicKey::from(&private);

        Ok(Self { private, public })
    }

    /// The public key, DER-encoded as a SubjectPublicKeyInfo.
    pub fn public_key_der(&self) -> Result<Vec<u8>> {
        self.public
            .to_public_key_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(|_| Error::ProtocolViolation)
    }

    /// Decrypts an OAEP-SHA256 ciphertext produced for this keypair's public key.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.private
            .decrypt(oaep(), ciphertext)
            .map_err(|_| Error::ProtocolViolation)
    }
}

/// Encrypts `plaintext` with OAEP-SHA256 under a peer's DER SPKI public key.
pub fn encrypt(public_key_der: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let public =
        RsaPublicKey::from_public_key_der(public_key_der).map_err(|_| Error::ProtocolViolation)?;

    public
        .encrypt(&mut rand::rngs::OsRng, oaep(), plaintext)
        .map_err(|_| Error::ProtocolViolation)
}
