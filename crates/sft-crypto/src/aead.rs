//! Envelope sealing and opening (ChaCha20-Poly1305, RFC 8439).
//!
//! An envelope is the encrypted-and-authenticated wire form of one logical
//! message: `ciphertext || 16-byte tag`. Nonces are derived from a per-key
//! message counter; the two directions of a session use distinct keys, so
//! counters on both sides may start at zero without nonce reuse.

use crate::{Error, Result};
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use zeroize::Zeroizing;

/// Construct an AEAD nonce from a message counter.
///
/// `nonce[0:4]` is fixed zero, `nonce[4:12]` is the counter little-endian.
pub fn construct_nonce(counter: u64) -> [u8; 12] {
    let mut nonce = [0u8; 12];
    nonce[4..12].copy_from_slice(&counter.to_le_bytes());
    nonce
}

/// Encrypt and authenticate one message.
///
/// Returns `ciphertext || tag`. The caller is responsible for nonce
/// uniqueness under `key`; use [`SessionCipher`] for stateful sessions.
pub fn seal(key: &[u8; 32], nonce: &[u8; 12], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));

    let payload = Payload {
        msg: plaintext,
        aad,
    };

    cipher
        .encrypt(Nonce::from_slice(nonce), payload)
        .map_err(|_| Error::Encryption("ChaCha20-Poly1305 encryption failed".into()))
}

/// Decrypt and verify one envelope.
///
/// Fail-closed: on any tag mismatch no plaintext is produced.
///
/// # Errors
///
/// Returns `Error::Decryption` if authentication fails.
pub fn open(
    key: &[u8; 32],
    nonce: &[u8; 12],
    envelope: &[u8],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));

    let payload = Payload { msg: envelope, aad };

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), payload)
        .map_err(|_| Error::Decryption("ChaCha20-Poly1305 authentication failed".into()))?;

    Ok(Zeroizing::new(plaintext))
}

/// Stateful session cipher holding the derived directional keys.
///
/// One instance per established channel. `seal` uses the send key and send
/// counter, `open` the receive key and receive counter. Counters advance on
/// every attempt, including a failed `open`, so a single corrupted envelope
/// cannot desynchronize the stream position.
pub struct SessionCipher {
    send_key: Zeroizing<[u8; 32]>,
    recv_key: Zeroizing<[u8; 32]>,
    send_counter: u64,
    recv_counter: u64,
}

impl SessionCipher {
    /// Create a session cipher from derived directional keys.
    pub fn new(send_key: Zeroizing<[u8; 32]>, recv_key: Zeroizing<[u8; 32]>) -> Self {
        Self {
            send_key,
            recv_key,
            send_counter: 0,
            recv_counter: 0,
        }
    }

    /// Seal one outgoing message into an envelope.
    pub fn seal(&mut self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce = construct_nonce(self.send_counter);
        self.send_counter = self
            .send_counter
            .checked_add(1)
            .ok_or_else(|| Error::Encryption("send counter exhausted".into()))?;
        seal(&self.send_key, &nonce, plaintext, &[])
    }

    /// Open one incoming envelope, verifying integrity and authenticity.
    ///
    /// # Errors
    ///
    /// Returns `Error::Decryption` if the envelope fails verification; no
    /// plaintext is returned in that case.
    pub fn open(&mut self, envelope: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let nonce = construct_nonce(self.recv_counter);
        self.recv_counter = self
            .recv_counter
            .checked_add(1)
            .ok_or_else(|| Error::Decryption("receive counter exhausted".into()))?;
        open(&self.recv_key, &nonce, envelope, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paired_ciphers() -> (SessionCipher, SessionCipher) {
        let a_key = Zeroizing::new([0x11u8; 32]);
        let b_key = Zeroizing::new([0x22u8; 32]);
        let alice = SessionCipher::new(a_key.clone(), b_key.clone());
        let bob = SessionCipher::new(b_key, a_key);
        (alice, bob)
    }

    #[test]
    fn nonce_layout() {
        let nonce = construct_nonce(0x4746454443424140);
        assert_eq!(&nonce[0..4], &[0, 0, 0, 0]);
        assert_eq!(
            &nonce[4..12],
            &[0x40, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x47]
        );
    }

    #[test]
    fn roundtrip() {
        let (mut alice, mut bob) = paired_ciphers();

        let envelope = alice.seal(b"hello").unwrap();
        let plaintext = bob.open(&envelope).unwrap();

        assert_eq!(&*plaintext, b"hello");
        assert_eq!(plaintext.len(), 5);
    }

    #[test]
    fn roundtrip_empty() {
        let (mut alice, mut bob) = paired_ciphers();

        let envelope = alice.seal(b"").unwrap();
        // Envelope is tag-only for empty plaintext.
        assert_eq!(envelope.len(), 16);

        let plaintext = bob.open(&envelope).unwrap();
        assert!(plaintext.is_empty());
    }

    #[test]
    fn counters_advance_per_message() {
        let (mut alice, mut bob) = paired_ciphers();

        for i in 0..10u8 {
            let envelope = alice.seal(&[i]).unwrap();
            let plaintext = bob.open(&envelope).unwrap();
            assert_eq!(&*plaintext, &[i]);
        }
    }

    #[test]
    fn any_single_bit_flip_is_detected() {
        let (mut alice, _) = paired_ciphers();
        let envelope = alice.seal(b"tamper target").unwrap();

        for byte in 0..envelope.len() {
            for bit in 0..8 {
                let mut tampered = envelope.clone();
                tampered[byte] ^= 1 << bit;

                // Fresh receiver so the counter matches the envelope.
                let mut bob =
                    SessionCipher::new(Zeroizing::new([0x22u8; 32]), Zeroizing::new([0x11u8; 32]));
                let result = bob.open(&tampered);
                assert!(
                    matches!(result, Err(Error::Decryption(_))),
                    "bit {} of byte {} accepted after tampering",
                    bit,
                    byte
                );
            }
        }
    }

    #[test]
    fn wrong_key_rejected() {
        let (mut alice, _) = paired_ciphers();
        let envelope = alice.seal(b"secret").unwrap();

        let mut mallory =
            SessionCipher::new(Zeroizing::new([0x33u8; 32]), Zeroizing::new([0x33u8; 32]));
        assert!(mallory.open(&envelope).is_err());
    }

    #[test]
    fn failed_open_still_advances_counter() {
        let (mut alice, mut bob) = paired_ciphers();

        let first = alice.seal(b"one").unwrap();
        let second = alice.seal(b"two").unwrap();

        let mut corrupted = first.clone();
        corrupted[0] ^= 0xFF;
        assert!(bob.open(&corrupted).is_err());

        // The next envelope still opens at the right counter position.
        let plaintext = bob.open(&second).unwrap();
        assert_eq!(&*plaintext, b"two");
    }
}
