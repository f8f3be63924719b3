//! A `Read` adapter that encrypts a plaintext stream into an
//! `EncryptedFileBlob` on the fly, so upload never needs the whole file
//! (or its ciphertext) resident in memory at once.

use std::collections::VecDeque;
use std::io::{self, Read};

use crate::file::FileEncryptor;

enum State<R> {
    Body(FileEncryptor, R),
    Done,
}

/// Wraps a plaintext reader, yielding the encrypted blob bytes.
pub struct EncryptingUploadBody<R> {
    state: State<R>,
    chunk_size: usize,
    pending: VecDeque<u8>,
}

impl<R: Read> EncryptingUploadBody<R> {
    /// Wraps `inner`, encrypting under `k_enc`/`k_mac` and reading at
    /// most `chunk_size` plaintext bytes from `inner` per internal pull.
    pub fn new(inner: R, k_enc: &[u8], k_mac: &[u8], chunk_size: usize) -> crate::Result<Self> {
        let encryptor = FileEncryptor::new(k_enc, k_mac)?;
        let mut pending = VecDeque::with_capacity(chunk_size.max(64));
        pending.extend(encryptor.prefix());

        Ok(Self {
            state: State::Body(encryptor, inner),
            chunk_size: chunk_size.max(1),
            pending,
        })
    }

    fn pull_more(&mut self) -> io::Result<()> {
        let state = std::mem::replace(&mut self.state, State::Done);
        match state {
            State::Body(mut encryptor, mut inner) => {
                let mut buf = vec![0u8; self.chunk_size];
                let n = inner.read(&mut buf)?;
                if n == 0 {
                    let (tail, tag) = encryptor.finish();
                    self.pending.extend(tail);
                    self.pending.extend(tag);
                    self.state = State::Done;
                } else {
                    let ciphertext = encryptor.write_chunk(&buf[..n]);
                    self.pending.extend(ciphertext);
                    self.state = State::Body(encryptor, inner);
                }
                Ok(())
            }
            State::Done => {
                self.state = State::Done;
                Ok(())
            }
        }
    }
}

impl<R: Read> Read for EncryptingUploadBody<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pending.is_empty() && !matches!(self.state, State::Done) {
            self.pull_more()?;
        }

        let n = self.pending.len().min(buf.len());
        for (slot, byte) in buf.iter_mut().take(n).zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}
