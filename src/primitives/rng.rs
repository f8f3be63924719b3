//! Random byte generation.

use rand::RngCore;

/// Fills and returns a `Vec<u8>` of `len` bytes from the OS RNG.
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    buf
}

/// Fills a fixed-size array from the OS RNG.
pub fn random_array<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    buf
}
