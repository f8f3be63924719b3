//! Blocking HTTP/JSON binding for the handshake, session-frame, and
//! file-upload endpoints.
//!
//! Synchronous by design: the protocol is request/response over HTTP,
//! not a duplex byte stream, so there is no event loop for an async
//! runtime to usefully drive here.

mod body;
pub mod wire;

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;

use crate::handshake::wire::{FinalizeRequest, FinalizeResponse, InitRequest, InitResponse};
use crate::primitives::b64_encode;
use crate::{Error, Result};
use body::EncryptingUploadBody;
use wire::{FileCategory, SessionFrameRequest, SessionFrameResponse, UploadResponse};

/// Maps a non-2xx HTTP status to this crate's error taxonomy.
fn map_status(status: StatusCode, body: String) -> Error {
    match status.as_u16() {
        400 => Error::FormatError,
        401 | 403 => Error::AuthenticationFailed,
        404 => Error::TransportError(format!("resource not found: {body}")),
        409 => Error::ReplayDetected,
        429 => Error::RateLimited,
        _ => Error::TransportError(format!("HTTP {status}: {body}")),
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(map_status(status, body))
}

/// A client-side transport bound to a single server base URL.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    file_chunk_size: usize,
}

impl HttpTransport {
    /// Builds a transport against `base_url` (no trailing slash),
    /// applying `finalize_timeout`/`frame_timeout` from `config` as the
    /// per-request timeout policy and `file_chunk_size` to the upload path.
    pub fn new(base_url: impl Into<String>, config: &crate::config::Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.frame_timeout)
            .build()
            .map_err(Error::from)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            file_chunk_size: config.file_chunk_size,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sends M1 and returns the server's init response.
    pub fn handshake_init(&self, request: &InitRequest) -> Result<InitResponse> {
        let response = self.client.post(self.url("/handshake/init")).json(request).send()?;
        check_status(response)?.json().map_err(Error::from)
    }

    /// Sends M2 under `client_id` and returns the server's finalize response.
    pub fn handshake_finalize(
        &self,
        client_id: &str,
        request: &FinalizeRequest,
        timeout: Duration,
    ) -> Result<FinalizeResponse> {
        let response = self
            .client
            .post(self.url("/handshake/finalize"))
            .header("X-Client-ID", client_id)
            .timeout(timeout)
            .json(request)
            .send()?;
        check_status(response)?.json().map_err(Error::from)
    }

    /// Posts a sealed session frame and returns the echoed plaintext
    /// (the `/session/test` contract; domain endpoints reuse the same
    /// envelope with a different response shape).
    pub fn session_test(
        &self,
        client_id: &str,
        encrypted_message: &str,
        client_signature: &str,
        bearer: Option<&str>,
    ) -> Result<String> {
        let mut builder = self
            .client
            .post(self.url("/session/test"))
            .header("X-Client-ID", client_id)
            .json(&SessionFrameRequest {
                encrypted_message: encrypted_message.to_string(),
                client_signature: client_signature.to_string(),
            });

        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send()?;
        let parsed: SessionFrameResponse = check_status(response)?.json().map_err(Error::from)?;
        Ok(parsed.plaintext)
    }

    /// Streams `plaintext` through encryption and uploads the resulting
    /// blob, attaching the four `X-*` headers the endpoint expects.
    pub fn upload_file(
        &self,
        client_id: &str,
        bearer: &str,
        filename: &str,
        mime: &str,
        category: FileCategory,
        k_enc: &[u8],
        k_mac: &[u8],
        plaintext: impl Read + Send + 'static,
    ) -> Result<UploadResponse> {
        let body = EncryptingUploadBody::new(plaintext, k_enc, k_mac, self.file_chunk_size)?;

        let response = self
            .client
            .post(self.url("/files/one/encrypted"))
            .bearer_auth(bearer)
            .header("X-Client-ID", client_id)
            .header("X-Orig-Filename", b64_encode(filename))
            .header("X-Orig-Mime", mime)
            .header("X-File-Category", category.as_header_value())
            .header("Content-Type", "application/octet-stream")
            .body(reqwest::blocking::Body::new(body))
            .send()?;

        check_status(response)?.json().map_err(Error::from)
    }
}
