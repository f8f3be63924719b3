//! JSON wire shapes for `/handshake/init` and `/handshake/finalize`.
//!
//! Every byte-valued field is a Base64 string on the wire; these types
//! carry the strings verbatim and leave decoding to [`super`], which
//! needs the raw bytes anyway to verify signatures. Both derives are
//! kept on every type (rather than splitting request/response direction)
//! since test fixtures play the peer role and need to parse what a real
//! client sends and produce what a real server returns.

use serde::{Deserialize, Serialize};

/// Request body for `POST /handshake/init`.
#[derive(Debug, Serialize, Deserialize)]
pub struct InitRequest {
    pub rsa_pub_client: String,
    pub ecdsa_pub_client: String,
    pub nonce1: String,
    pub signature1: String,
}

/// Response body for `POST /handshake/init`.
#[derive(Debug, Serialize, Deserialize)]
pub struct InitResponse {
    pub client_id: String,
    pub rsa_pub_server: String,
    pub ecdsa_pub_server: String,
    pub nonce2: String,
    pub signature2: String,
}

/// Request body for `POST /handshake/finalize`.
#[derive(Debug, Serialize, Deserialize)]
pub struct FinalizeRequest {
    pub encrypted: String,
    pub signature3: String,
}

/// Response body for `POST /handshake/finalize`.
#[derive(Debug, Serialize, Deserialize)]
pub struct FinalizeResponse {
    pub signature4: String,
}
