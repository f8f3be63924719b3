//! JSON wire shapes for `/session/test` and `/files/one/encrypted`.

use serde::{Deserialize, Serialize};

/// Request body for `POST /session/test`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionFrameRequest {
    pub encrypted_message: String,
    pub client_signature: String,
}

/// Response body for `POST /session/test`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionFrameResponse {
    pub plaintext: String,
}

/// Response body for `POST /files/one/encrypted`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub obj_id: String,
    pub url: String,
    pub name: String,
    pub mime_type: String,
    /// `YYYY-MM-DDTHH:MM:SSZ`.
    pub created_at: String,
}

/// The `X-File-Category` header value.
#[derive(Debug, Clone, Copy)]
pub enum FileCategory {
    Photo,
    Video,
    Text,
    Unknown,
}

impl FileCategory {
    pub fn as_header_value(self) -> &'static str {
        match self {
            FileCategory::Photo => "photo",
            FileCategory::Video => "video",
            FileCategory::Text => "text",
            FileCategory::Unknown => "unknown",
        }
    }
}
