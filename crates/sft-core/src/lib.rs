//! Secure channel core for the sft session protocol.
//!
//! This crate owns all protocol-level state and implements:
//! - The secure messaging primitive: one plaintext in, one authenticated
//!   envelope out, and the fail-closed inverse ([`channel`])
//! - Session establishment: certificate exchange, X25519 key agreement,
//!   and mutual authentication with freshness ([`handshake`])
//! - Chunked bulk transfer with stop-and-wait acknowledgment ([`transfer`])
//!
//! Transports and crypto backends are consumed through the capability
//! traits in [`traits`]; the core never touches sockets or cipher
//! internals directly.
//!
//! Channels are strictly single-writer: one channel serves one peer
//! connection, and a concurrent server must give every accepted connection
//! its own channel and thread.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod channel;
pub mod error;
pub mod handshake;
pub mod traits;
pub mod transfer;

pub use channel::{Phase, SecureChannel};
pub use error::{Error, Result};
pub use handshake::Credentials;
pub use traits::{EnvelopeCipher, MessageTransport};
pub use transfer::{ACK_TOKEN, CHUNK_SIZE, NAK_TOKEN};
