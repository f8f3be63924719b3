//! Cryptographic primitives: RNG, signing, RSA-OAEP, AES-CBC, HMAC, padding and codecs.
//!
//! Nothing in this module knows about the handshake or session wire
//! formats; it only wraps the underlying RustCrypto crates with the
//! exact parameters the protocol requires (SHA-256 everywhere, P-256
//! ECDSA, RSA-3072, AES-256-CBC).

pub mod cipher;
pub mod codec;
pub mod hmac;
pub mod rng;
pub mod rsa;
pub mod sign;

pub use cipher::{decrypt_padded, pkcs7_pad_len, CbcEncryptor, BLOCK_SIZE};
pub use codec::{b64_decode, b64_encode};
pub use hmac::{hmac_sha256, verify_hmac_sha256, HmacStream};
pub use rng::{random_array, random_bytes};
pub use rsa::RsaKeypair;
pub use sign::EcdsaKeypair;
