//! Capability traits the channel core is built against.
//!
//! The core holds exactly one transport handle and (once established) one
//! cipher per channel. Both are consumed through these contracts so that
//! backends stay swappable and the core is testable with in-memory fakes.

use crate::{Error, Result};
use sft_crypto::SessionCipher;
use std::io;
use zeroize::Zeroizing;

/// A reliable transport delivering discrete messages.
///
/// Each `send_msg` corresponds to exactly one `recv_msg` on the peer; the
/// transport preserves message boundaries. The core makes no assumption
/// about the framing used underneath.
pub trait MessageTransport {
    /// Deliver one discrete message. An error is a fatal I/O fault.
    fn send_msg(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Receive the next discrete message in full.
    ///
    /// Returns `Ok(None)` when the peer closed the connection in an
    /// orderly way; that is not an error.
    fn recv_msg(&mut self) -> io::Result<Option<Vec<u8>>>;
}

/// Encrypt-and-authenticate / decrypt-and-verify over opaque payloads.
///
/// The envelope format is entirely the cipher's business; the channel only
/// sees a byte length and a validity outcome.
pub trait EnvelopeCipher: Send {
    /// Produce the envelope for one plaintext message.
    fn seal(&mut self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Recover the plaintext from one envelope, verifying integrity and
    /// authenticity. Fail-closed: a rejected envelope yields
    /// [`Error::IntegrityFailure`] and no plaintext.
    fn open(&mut self, envelope: &[u8]) -> Result<Zeroizing<Vec<u8>>>;
}

impl EnvelopeCipher for SessionCipher {
    fn seal(&mut self, plaintext: &[u8]) -> Result<Vec<u8>> {
        SessionCipher::seal(self, plaintext).map_err(Error::Crypto)
    }

    fn open(&mut self, envelope: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        SessionCipher::open(self, envelope).map_err(|e| match e {
            sft_crypto::Error::Decryption(_) => Error::IntegrityFailure,
            other => Error::Crypto(other),
        })
    }
}
