//! Cryptographic primitives for the sft session protocol.
//!
//! This crate implements the crypto capability consumed by `sft-core`:
//! - Ephemeral key exchange (X25519)
//! - Session key derivation (HKDF-SHA256, one key per direction)
//! - Envelope sealing/opening (ChaCha20-Poly1305 with counter nonces)
//! - Long-term identity signatures (Ed25519)
//!
//! Security conventions:
//! - All secrets use `Zeroizing` wrappers
//! - No logging of key material
//! - Fail-closed: an envelope that does not authenticate yields no plaintext

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aead;
pub mod error;
pub mod kdf;
pub mod kex;
pub mod sign;

pub use aead::SessionCipher;
pub use error::{Error, Result};
pub use kex::EphemeralKeyPair;
pub use sign::{IdentityKeyPair, IdentityPublicKey};
