//! ECDSA P-256 signing over SHA-256, with DER-encoded keys and signatures.

use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::{DecodePublicKey, EncodePublicKey};
use zeroize::ZeroizeOnDrop;

use crate::{Error, Result};

/// An ephemeral ECDSA P-256 keypair, generated fresh for a single handshake.
///
/// The private key is zeroized on drop; it is never persisted or reused
/// across handshakes.
#[derive(ZeroizeOnDrop)]
pub struct EcdsaKeypair {
    #[zeroize(skip)]
    verifying: VerifyingKey,
    signing: SigningKey,
}

impl EcdsaKeypair {
    /// Generates a fresh P-256 keypair from the OS RNG.
    pub fn generate() -> Self {
        let signing = SigningKey::random(&mut rand::rngs::OsRng);
        let verifying = *signing.verifying_key();

        Self { signing, verifying }
    }

    /// The public key, DER-encoded as a SubjectPublicKeyInfo.
    pub fn public_key_der(&self) -> Result<Vec<u8>> {
        self.verifying
            .to_public_key_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(|_| Error::ProtocolViolation)
    }

    /// Signs `data`, returning a DER-encoded ECDSA signature.
    pub fn sign(&self, data: &[u8]) -> Vec<u8> {
        let signature: Signature = self.signing.sign(data);
        signature.to_der().as_bytes().to_vec()
    }
}

/// Decodes a DER SubjectPublicKeyInfo into a verifying key usable with [`verify`].
pub fn verifying_key_from_der(der: &[u8]) -> Result<VerifyingKey> {
    VerifyingKey::from_public_key_der(der).map_err(|_| Error::ProtocolViolation)
}

/// Verifies a DER-encoded ECDSA signature over `data` against `public_key_der`.
///
/// Any malformed key, malformed signature, or signature mismatch is
/// folded into [`Error::ProtocolViolation`] uniformly — callers learn
/// only that the peer's claim didn't check out.
pub fn verify(public_key_der: &[u8], data: &[u8], signature_der: &[u8]) -> Result<()> {
    let key = verifying_key_from_der(public_key_der)?;
    let signature = Signature::from_der(signature_der).map_err(|_| Error::ProtocolViolation)?;

    key.verify(data, &signature)
        .map_err(|_| Error::ProtocolViolation)
}
