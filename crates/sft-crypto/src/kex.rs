//! X25519 ephemeral key exchange (RFC 7748).
//!
//! One `EphemeralKeyPair` is generated per handshake and discarded once the
//! session keys are derived. Private scalars and shared secrets are wrapped
//! in `Zeroizing` so they are cleared from memory on drop.

use crate::{Error, Result};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

/// X25519 key pair used for one Diffie-Hellman key agreement.
pub struct EphemeralKeyPair {
    /// Private scalar (32 bytes), zeroed on drop.
    private_key: Zeroizing<StaticSecret>,
    /// Public key point (32 bytes).
    public_key: PublicKey,
}

impl EphemeralKeyPair {
    /// Generate a new random keypair using a cryptographically secure RNG.
    pub fn generate() -> Self {
        let private_key = StaticSecret::random_from_rng(rand::rngs::OsRng);
        let public_key = PublicKey::from(&private_key);

        Self {
            private_key: Zeroizing::new(private_key),
            public_key,
        }
    }

    /// Get the public key as a 32-byte array, safe to send to the peer.
    pub fn public_key(&self) -> &[u8; 32] {
        self.public_key.as_bytes()
    }

    /// Compute the shared secret with a peer's public key.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyExchange` if the peer's public key is a low-order
    /// point (the resulting secret would be all zeros).
    pub fn exchange(&self, peer_public: &[u8; 32]) -> Result<Zeroizing<[u8; 32]>> {
        let peer_key = PublicKey::from(*peer_public);
        let shared = self.private_key.diffie_hellman(&peer_key);

        // All-zero output means the peer supplied a low-order point.
        if shared.as_bytes() == &[0u8; 32] {
            return Err(Error::KeyExchange(
                "invalid peer public key (low-order point)".into(),
            ));
        }

        Ok(Zeroizing::new(*shared.as_bytes()))
    }

    /// Create a keypair from a raw private scalar. Test-vector use only.
    #[doc(hidden)]
    pub fn from_private(private: [u8; 32]) -> Self {
        let private_key = StaticSecret::from(private);
        let public_key = PublicKey::from(&private_key);

        Self {
            private_key: Zeroizing::new(private_key),
            public_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// RFC 7748 §6.1 canonical test vectors.
    #[test]
    fn rfc7748_vectors() {
        let alice_private: [u8; 32] =
            hex::decode("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a")
                .unwrap()
                .try_into()
                .unwrap();
        let bob_private: [u8; 32] =
            hex::decode("5dab087e624a8a4b79e17f8b83800ee66f3bb1292618b6fd1c2f8b27ff88e0eb")
                .unwrap()
                .try_into()
                .unwrap();
        let expected_shared =
            hex::decode("4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742")
                .unwrap();

        let alice = EphemeralKeyPair::from_private(alice_private);
        let bob = EphemeralKeyPair::from_private(bob_private);

        let alice_shared = alice.exchange(bob.public_key()).unwrap();
        let bob_shared = bob.exchange(alice.public_key()).unwrap();

        assert_eq!(&*alice_shared, expected_shared.as_slice());
        assert_eq!(&*alice_shared, &*bob_shared);
    }

    #[test]
    fn random_exchange_agrees() {
        let alice = EphemeralKeyPair::generate();
        let bob = EphemeralKeyPair::generate();

        let alice_shared = alice.exchange(bob.public_key()).unwrap();
        let bob_shared = bob.exchange(alice.public_key()).unwrap();

        assert_eq!(&*alice_shared, &*bob_shared);
        assert_ne!(&*alice_shared, &[0u8; 32]);
    }

    #[test]
    fn rejects_low_order_point() {
        let alice = EphemeralKeyPair::generate();
        let result = alice.exchange(&[0u8; 32]);
        assert!(matches!(result, Err(Error::KeyExchange(_))));
    }
}
