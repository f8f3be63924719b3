#![doc = concat!(
    "[![crates.io](https://img.shields.io/crates/v/", env!("CARGO_PKG_NAME"), ")](https://crates.io/crates/", env!("CARGO_PKG_NAME"), ")",
    " ",
    "![license](https://img.shields.io/crates/l/", env!("CARGO_PKG_NAME"), ")"
)]
#![doc = ""]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! ### Protocol overview
//!
//! A client establishes a session with a server through a two-message
//! handshake ([`handshake`]), derives symmetric keys from the resulting
//! secret ([`keys`]), then exchanges authenticated, replay-protected
//! frames ([`session`]) and streams encrypted files ([`file`]) over HTTP
//! ([`http`]).
#![warn(missing_docs, clippy::unwrap_used, clippy::panic, clippy::unimplemented)]
#![forbid(unsafe_code)]

mod error;
pub use error::{Error, Result};

pub mod config;
pub mod file;
pub mod handshake;
pub mod http;
pub mod keys;
pub mod primitives;
pub mod session;
