//! AES-256-CBC encryption with PKCS#7 padding.
//!
//! Padding is implemented as a standalone primitive (rather than folded
//! into the cipher call) so the file-AE streaming path can apply it only
//! once, at end-of-input, while still calling through the same block
//! cipher used for the one-shot session-frame path.

use cipher::{Block, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::{Error, Result};

/// AES/CBC block size in bytes.
pub const BLOCK_SIZE: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Number of padding bytes PKCS#7 would add to a message of length `len`.
pub fn pkcs7_pad_len(len: usize) -> usize {
    BLOCK_SIZE - (len % BLOCK_SIZE)
}

/// Appends PKCS#7 padding to `data`, bringing it to a multiple of [`BLOCK_SIZE`].
///
/// A message whose length is already a multiple of the block size still
/// gets a full padding block, per the PKCS#7 definition.
pub fn pkcs7_pad(data: &mut Vec<u8>) {
    let pad_len = pkcs7_pad_len(data.len());
    data.resize(data.len() + pad_len, pad_len as u8);
}

/// Strips and validates PKCS#7 padding.
///
/// Returns [`Error::FormatError`] on any malformed padding — this is kept
/// indistinguishable from a MAC failure by callers,
/// since by the time this runs the MAC has already been checked.
pub fn pkcs7_unpad(data: &[u8]) -> Result<&[u8]> {
    if data.is_empty() || data.len() % BLOCK_SIZE != 0 {
        return Err(Error::FormatError);
    }

    let pad_len = *data.last().expect("checked non-empty above") as usize;
    if pad_len == 0 || pad_len > BLOCK_SIZE || pad_len > data.len() {
        return Err(Error::FormatError);
    }

    let (unpadded, padding) = data.split_at(data.len() - pad_len);
    if padding.iter().any(|&b| b as usize != pad_len) {
        return Err(Error::FormatError);
    }

    Ok(unpadded)
}

/// A streaming AES-256-CBC encryptor over raw (already block-aligned) data.
///
/// Used both for the single-shot session-frame path (one call, full
/// plaintext, immediately finished) and the chunked file-AE path.
pub struct CbcEncryptor {
    cipher: Aes256CbcEnc,
    carry: Vec<u8>,
}

impl CbcEncryptor {
    /// Creates a new encryptor under `key` (32 bytes) and `iv` (16 bytes).
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self> {
        let cipher = Aes256CbcEnc::new_from_slices(key, iv).map_err(|_| Error::ProtocolViolation)?;

        Ok(Self {
            cipher,
            carry: Vec::with_capacity(BLOCK_SIZE),
        })
    }

    /// Encrypts as many full blocks as `plaintext` (plus any carried-over
    /// bytes from a previous call) allows, returning the produced
    /// ciphertext. Never pads — see [`CbcEncryptor::finish`].
    pub fn update(&mut self, plaintext: &[u8]) -> Vec<u8> {
        self.carry.extend_from_slice(plaintext);

        let mut out = Vec::with_capacity(self.carry.len() - self.carry.len() % BLOCK_SIZE);
        let full_blocks = self.carry.len() / BLOCK_SIZE;

        for chunk in self
            .carry
            .drain(..full_blocks * BLOCK_SIZE)
            .collect::<Vec<_>>()
            .chunks_exact(BLOCK_SIZE)
        {
            let mut block = Block::<aes::Aes256>::clone_from_slice(chunk);
            self.cipher.encrypt_block_mut(&mut block);
            out.extend_from_slice(block.as_slice());
        }

        out
    }

    /// Applies PKCS#7 padding to any carried-over tail and encrypts the
    /// final block(s), consuming the encryptor.
    pub fn finish(mut self) -> Vec<u8> {
        let mut tail = std::mem::take(&mut self.carry);
        pkcs7_pad(&mut tail);

        let mut out = Vec::with_capacity(tail.len());
        for chunk in tail.chunks_exact(BLOCK_SIZE) {
            let mut block = Block::<aes::Aes256>::clone_from_slice(chunk);
            self.cipher.encrypt_block_mut(&mut block);
            out.extend_from_slice(block.as_slice());
        }

        out
    }
}

/// Decrypts a complete AES-256-CBC ciphertext (length must be a multiple
/// of [`BLOCK_SIZE`]) and strips its PKCS#7 padding.
///
/// This crate only ever needs buffered decryption, so unlike
/// [`CbcEncryptor`] there is no streaming variant.
pub fn decrypt_padded(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(Error::FormatError);
    }

    let mut cipher = Aes256CbcDec::new_from_slices(key, iv).map_err(|_| Error::ProtocolViolation)?;

    let mut plaintext = Vec::with_capacity(ciphertext.len());
    for chunk in ciphertext.chunks_exact(BLOCK_SIZE) {
        let mut block = Block::<aes::Aes256>::clone_from_slice(chunk);
        cipher.decrypt_block_mut(&mut block);
        plaintext.extend_from_slice(block.as_slice());
    }

    pkcs7_unpad(&plaintext).map(<[u8]>::to_vec)
}
