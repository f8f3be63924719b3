//! An in-process HTTP peer implementing enough of the four endpoints to
//! drive the handshake, session-frame, and file-upload integration
//! tests end to end, including nonce-replay conflicts.
//!
//! Not part of the public API: this module exists only under `tests/`.

use std::collections::{HashMap, HashSet};
use std::io::Read as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::thread::JoinHandle;

use secchan::config::KeySchedule;
use secchan::handshake::wire::{FinalizeRequest, FinalizeResponse, InitRequest, InitResponse};
use secchan::http::wire::{SessionFrameRequest, SessionFrameResponse, UploadResponse};
use secchan::keys::SessionKeys;
use secchan::primitives::{b64_decode, b64_encode, random_array, sign, EcdsaKeypair, RsaKeypair};
use secchan::session::{InMemoryReplayGuard, ReplayGuard};
use tiny_http::{Header, Method, Response as HttpResponse, Server};

struct PendingHandshake {
    server_rsa: RsaKeypair,
    server_ecdsa: EcdsaKeypair,
    client_ecdsa_pub: Vec<u8>,
    nonce1: Vec<u8>,
    nonce2: [u8; 8],
}

struct EstablishedSession {
    client_ecdsa_pub: Vec<u8>,
    keys: SessionKeys,
}

#[derive(Default)]
struct State {
    pending: HashMap<String, PendingHandshake>,
    established: HashMap<String, EstablishedSession>,
    seen_nonce1: HashSet<Vec<u8>>,
    seen_nonce3: HashSet<(String, Vec<u8>)>,
    frame_guard: InMemoryReplayGuard,
}

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

fn json_response(status: u16, body: &impl serde::Serialize) -> HttpResponse<std::io::Cursor<Vec<u8>>> {
    let payload = serde_json::to_string(body).expect("wire types always serialize");
    HttpResponse::from_string(payload)
        .with_status_code(status)
        .with_header(Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap())
}

fn empty_status(status: u16) -> HttpResponse<std::io::Cursor<Vec<u8>>> {
    HttpResponse::from_string(String::new()).with_status_code(status)
}

/// A running mock server. Dropping it stops the listener thread.
pub struct MockServer {
    pub base_url: String,
    handle: Option<JoinHandle<()>>,
    server: std::sync::Arc<Server>,
}

impl MockServer {
    /// Binds to an OS-assigned port on localhost and starts serving.
    pub fn start() -> Self {
        let server = std::sync::Arc::new(Server::http("127.0.0.1:0").expect("bind mock server"));
        let base_url = format!("http://{}", server.server_addr());

        let state = std::sync::Arc::new(Mutex::new(State::default()));
        let server_for_thread = server.clone();
        let handle = std::thread::spawn(move || {
            for mut request in server_for_thread.incoming_requests() {
                let mut body = Vec::new();
                let _ = request.as_reader().read_to_end(&mut body);

                let response = handle_request(&state, request.method(), request.url(), &request, &body);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            handle: Some(handle),
            server,
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn header_value<'a>(request: &'a tiny_http::Request, name: &'static str) -> Option<&'a str> {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str())
}

fn handle_request(
    state: &std::sync::Arc<Mutex<State>>,
    method: &Method,
    url: &str,
    request: &tiny_http::Request,
    body: &[u8],
) -> HttpResponse<std::io::Cursor<Vec<u8>>> {
    if *method != Method::Post {
        return empty_status(404);
    }

    match url {
        "/handshake/init" => handle_init(state, body),
        "/handshake/finalize" => handle_finalize(state, header_value(request, "X-Client-ID"), body),
        "/session/test" => handle_session_test(state, header_value(request, "X-Client-ID"), body),
        "/files/one/encrypted" => handle_upload(state, header_value(request, "X-Client-ID"), body),
        _ => empty_status(404),
    }
}

fn handle_init(state: &std::sync::Arc<Mutex<State>>, body: &[u8]) -> HttpResponse<std::io::Cursor<Vec<u8>>> {
    let request: InitRequest = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(_) => return empty_status(400),
    };

    let Ok(client_rsa_pub) = b64_decode(&request.rsa_pub_client) else {
        return empty_status(400);
    };
    let Ok(client_ecdsa_pub) = b64_decode(&request.ecdsa_pub_client) else {
        return empty_status(400);
    };
    let Ok(nonce1) = b64_decode(&request.nonce1) else {
        return empty_status(400);
    };
    let Ok(signature1) = b64_decode(&request.signature1) else {
        return empty_status(400);
    };

    let mut covered = Vec::new();
    covered.extend_from_slice(&client_rsa_pub);
    covered.extend_from_slice(&client_ecdsa_pub);
    covered.extend_from_slice(&nonce1);
    if sign::verify(&client_ecdsa_pub, &covered, &signature1).is_err() {
        return empty_status(400);
    }

    let mut state = state.lock().unwrap();
    if !state.seen_nonce1.insert(nonce1.clone()) {
        return empty_status(409);
    }

    let client_id = format!("C{}", NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed));
    let server_rsa = RsaKeypair::generate().expect("generate server RSA key");
    let server_ecdsa = EcdsaKeypair::generate();
    let nonce2: [u8; 8] = random_array();

    let rsa_pub_server = server_rsa.public_key_der().expect("encode server RSA key");
    let ecdsa_pub_server = server_ecdsa.public_key_der().expect("encode server ECDSA key");

    let mut signed = Vec::new();
    signed.extend_from_slice(&rsa_pub_server);
    signed.extend_from_slice(&ecdsa_pub_server);
    signed.extend_from_slice(&nonce2);
    signed.extend_from_slice(&nonce1);
    signed.extend_from_slice(client_id.as_bytes());
    let signature2 = server_ecdsa.sign(&signed);

    let response = InitResponse {
        client_id: client_id.clone(),
        rsa_pub_server: b64_encode(&rsa_pub_server),
        ecdsa_pub_server: b64_encode(&ecdsa_pub_server),
        nonce2: b64_encode(nonce2),
        signature2: b64_encode(&signature2),
    };

    state.pending.insert(
        client_id,
        PendingHandshake {
            server_rsa,
            server_ecdsa,
            client_ecdsa_pub,
            nonce1,
            nonce2,
        },
    );

    json_response(200, &response)
}

fn handle_finalize(
    state: &std::sync::Arc<Mutex<State>>,
    client_id: Option<&str>,
    body: &[u8],
) -> HttpResponse<std::io::Cursor<Vec<u8>>> {
    let Some(client_id) = client_id else {
        return empty_status(400);
    };
    let request: FinalizeRequest = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(_) => return empty_status(400),
    };

    let mut state = state.lock().unwrap();
    let Some(pending) = state.pending.remove(client_id) else {
        return empty_status(400);
    };

    let Ok(encrypted) = b64_decode(&request.encrypted) else {
        return empty_status(400);
    };
    let Ok(blob) = pending.server_rsa.decrypt(&encrypted) else {
        return empty_status(400);
    };
    if blob.len() != 48 {
        return empty_status(400);
    }

    let ks = &blob[..32];
    let nonce3 = blob[32..40].to_vec();

    if !state.seen_nonce3.insert((client_id.to_string(), nonce3.clone())) {
        return empty_status(409);
    }

    let mut covered = Vec::new();
    covered.extend_from_slice(ks);
    covered.extend_from_slice(&nonce3);
    covered.extend_from_slice(&pending.nonce2);
    let signature4 = pending.server_ecdsa.sign(&covered);

    let keys = match SessionKeys::derive(ks, KeySchedule::Hmac) {
        Ok(keys) => keys,
        Err(_) => return empty_status(400),
    };

    state.established.insert(
        client_id.to_string(),
        EstablishedSession {
            client_ecdsa_pub: pending.client_ecdsa_pub,
            keys,
        },
    );

    json_response(
        200,
        &FinalizeResponse {
            signature4: b64_encode(&signature4),
        },
    )
}

fn handle_session_test(
    state: &std::sync::Arc<Mutex<State>>,
    client_id: Option<&str>,
    body: &[u8],
) -> HttpResponse<std::io::Cursor<Vec<u8>>> {
    let Some(client_id) = client_id else {
        return empty_status(400);
    };
    let request: SessionFrameRequest = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(_) => return empty_status(400),
    };

    let state = state.lock().unwrap();
    let Some(session) = state.established.get(client_id) else {
        return empty_status(400);
    };

    let Ok(package) = b64_decode(&request.encrypted_message) else {
        return empty_status(400);
    };
    let Ok(signature) = b64_decode(&request.client_signature) else {
        return empty_status(400);
    };
    if sign::verify(&session.client_ecdsa_pub, &package, &signature).is_err() {
        return empty_status(400);
    }

    if package.len() < 16 + 32 {
        return empty_status(400);
    }
    let (framed, tag) = package.split_at(package.len() - 32);
    if secchan::primitives::verify_hmac_sha256(&session.keys.k_mac, framed, tag).is_err() {
        return empty_status(400);
    }

    let (iv, ciphertext) = framed.split_at(16);
    let Ok(plaintext) = secchan::primitives::decrypt_padded(&session.keys.k_enc, iv, ciphertext) else {
        return empty_status(400);
    };
    if plaintext.len() < 24 {
        return empty_status(400);
    }
    let (_timestamp, rest) = plaintext.split_at(8);
    let (nonce, payload) = rest.split_at(16);

    if state.frame_guard.check_and_record(client_id, nonce).is_err() {
        return empty_status(409);
    }

    json_response(
        200,
        &SessionFrameResponse {
            plaintext: String::from_utf8_lossy(payload).into_owned(),
        },
    )
}

fn handle_upload(
    state: &std::sync::Arc<Mutex<State>>,
    client_id: Option<&str>,
    body: &[u8],
) -> HttpResponse<std::io::Cursor<Vec<u8>>> {
    let Some(client_id) = client_id else {
        return empty_status(400);
    };

    let state = state.lock().unwrap();
    let Some(session) = state.established.get(client_id) else {
        return empty_status(400);
    };

    if secchan::file::decrypt_blob(&session.keys.k_enc, &session.keys.k_mac, body).is_err() {
        return empty_status(400);
    }

    json_response(
        200,
        &UploadResponse {
            obj_id: "obj-1".to_string(),
            url: "https://storage.example.test/obj-1".to_string(),
            name: "upload.bin".to_string(),
            mime_type: "application/octet-stream".to_string(),
            created_at: "2026-08-01T00:00:00Z".to_string(),
        },
    )
}
