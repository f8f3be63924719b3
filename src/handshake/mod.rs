//! The two-message mutual-authentication handshake.
//!
//! The client side is modeled as a typestate machine
//! (`Idle → AwaitInitResp → AwaitFinalizeResp → Established`): each state
//! is a distinct type exposing only the operation valid from it, so an
//! illegal transition is a compile error rather than a runtime check.
//! Any verification failure consumes and drops the in-progress state
//! (and, with it, its ephemeral key material) instead of leaving it
//! around for a caller to misuse.

pub mod wire;

use zeroize::Zeroizing;

use crate::config::Config;
use crate::primitives::{random_array, rsa, sign, RsaKeypair};
use crate::primitives::{b64_decode, b64_encode};
use crate::session::Session;
use crate::{Error, Result};
use wire::{FinalizeRequest, FinalizeResponse, InitRequest, InitResponse};

/// An RSA-3072 + ECDSA P-256 keypair generated fresh for one handshake
/// and never persisted beyond it.
pub struct EphemeralKeypair {
    rsa: RsaKeypair,
    ecdsa: sign::EcdsaKeypair,
}

impl EphemeralKeypair {
    /// Generates a fresh keypair pair from the OS RNG.
    pub fn generate() -> Result<Self> {
        Ok(Self {
            rsa: RsaKeypair::generate()?,
            ecdsa: sign::EcdsaKeypair::generate(),
        })
    }
}

fn signature2_message(
    rsa_pub_server: &[u8],
    ecdsa_pub_server: &[u8],
    nonce2: &[u8],
    nonce1: &[u8],
    client_id: &str,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(
        rsa_pub_server.len() + ecdsa_pub_server.len() + nonce2.len() + nonce1.len() + client_id.len(),
    );
    buf.extend_from_slice(rsa_pub_server);
    buf.extend_from_slice(ecdsa_pub_server);
    buf.extend_from_slice(nonce2);
    buf.extend_from_slice(nonce1);
    buf.extend_from_slice(client_id.as_bytes());
    buf
}

fn session_secret_blob(ks: &[u8], nonce3: &[u8], nonce2: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(ks.len() + nonce3.len() + nonce2.len());
    buf.extend_from_slice(ks);
    buf.extend_from_slice(nonce3);
    buf.extend_from_slice(nonce2);
    buf
}

/// Initial state: no network round trip has happened yet.
pub struct Idle {
    config: Config,
}

impl Idle {
    /// Starts a new handshake attempt under `config`.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Generates the client's ephemeral keys and nonce1, producing M1.
    pub fn begin(self) -> Result<(AwaitInitResp, InitRequest)> {
        let client_keys = EphemeralKeypair::generate()?;
        let nonce1: [u8; 8] = random_array();

        let rsa_pub = client_keys.rsa.public_key_der()?;
        let ecdsa_pub = client_keys.ecdsa.public_key_der()?;

        let mut covered = Vec::with_capacity(rsa_pub.len() + ecdsa_pub.len() + nonce1.len());
        covered.extend_from_slice(&rsa_pub);
        covered.extend_from_slice(&ecdsa_pub);
        covered.extend_from_slice(&nonce1);
        let signature1 = client_keys.ecdsa.sign(&covered);

        let request = InitRequest {
            rsa_pub_client: b64_encode(&rsa_pub),
            ecdsa_pub_client: b64_encode(&ecdsa_pub),
            nonce1: b64_encode(nonce1),
            signature1: b64_encode(&signature1),
        };

        Ok((
            AwaitInitResp {
                config: self.config,
                client_keys,
                nonce1,
            },
            request,
        ))
    }
}

/// M1 has been sent; waiting on (or holding) the server's init response.
pub struct AwaitInitResp {
    config: Config,
    client_keys: EphemeralKeypair,
    nonce1: [u8; 8],
}

impl AwaitInitResp {
    /// Verifies `signature2` and, on success, builds M2.
    ///
    /// Consumes `self` either way: on failure the ephemeral keys and
    /// nonce are dropped with it, satisfying the "fresh material on
    /// retry" failure policy.
    pub fn on_init_response(self, response: InitResponse) -> Result<(AwaitFinalizeResp, FinalizeRequest)> {
        let rsa_pub_server = b64_decode(&response.rsa_pub_server)?;
        let ecdsa_pub_server = b64_decode(&response.ecdsa_pub_server)?;
        let nonce2 = b64_decode(&response.nonce2)?;
        let signature2 = b64_decode(&response.signature2)?;

        let covered = signature2_message(
            &rsa_pub_server,
            &ecdsa_pub_server,
            &nonce2,
            &self.nonce1,
            &response.client_id,
        );
        sign::verify(&ecdsa_pub_server, &covered, &signature2).inspect_err(|_| {
            tracing::warn!("signature2 verification failed for client_id `{}`", response.client_id);
        })?;

        let nonce2_arr: [u8; 8] = nonce2.as_slice().try_into().map_err(|_| Error::ProtocolViolation)?;
        let nonce3: [u8; 8] = random_array();
        let ks = Zeroizing::new(random_array::<32>());

        let blob = session_secret_blob(ks.as_slice(), &nonce3, &nonce2_arr);
        let signature3 = self.client_keys.ecdsa.sign(&blob);
        let encrypted = rsa::encrypt(&rsa_pub_server, &blob)?;

        let request = FinalizeRequest {
            encrypted: b64_encode(&encrypted),
            signature3: b64_encode(&signature3),
        };

        Ok((
            AwaitFinalizeResp {
                config: self.config,
                client_id: response.client_id,
                client_keys: self.client_keys,
                server_ecdsa_pub: ecdsa_pub_server,
                ks,
                nonce2: nonce2_arr,
                nonce3,
            },
            request,
        ))
    }
}

/// M2 has been sent; waiting on (or holding) the server's finalize response.
pub struct AwaitFinalizeResp {
    config: Config,
    client_id: String,
    client_keys: EphemeralKeypair,
    server_ecdsa_pub: Vec<u8>,
    ks: Zeroizing<[u8; 32]>,
    nonce2: [u8; 8],
    nonce3: [u8; 8],
}

impl AwaitFinalizeResp {
    /// Verifies `signature4` and, on success, establishes the session.
    pub fn on_finalize_response(self, response: FinalizeResponse) -> Result<Established> {
        let signature4 = b64_decode(&response.signature4)?;
        let blob = session_secret_blob(self.ks.as_slice(), &self.nonce3, &self.nonce2);
        sign::verify(&self.server_ecdsa_pub, &blob, &signature4)?;

        let session = Session::establish(
            self.client_id,
            self.ks.as_slice(),
            self.client_keys.ecdsa,
            self.config.key_schedule,
        )?;

        tracing::debug!("handshake established for client_id `{}`", session.client_id());
        Ok(Established { session })
    }
}

/// The handshake completed; `session` is ready for framing.
pub struct Established {
    /// The established session: client id, derived keys, and the
    /// client's signing key, ready to build and verify session frames.
    pub session: Session,
}
