//! Long-term identity signatures (Ed25519).
//!
//! Identity keys sign the handshake authentication message and certificate
//! contents. They never encrypt anything; session confidentiality comes
//! from the ephemeral exchange in [`crate::kex`].

use crate::{Error, Result};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use zeroize::Zeroizing;

/// Length of an Ed25519 signature in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Length of an Ed25519 public key in bytes.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Long-term Ed25519 identity key pair.
pub struct IdentityKeyPair {
    signing_key: SigningKey,
}

impl IdentityKeyPair {
    /// Generate a new identity key pair using a cryptographically secure RNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
        Self { signing_key }
    }

    /// Reconstruct a key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The 32-byte seed, for persisting the identity. Zeroed on drop.
    pub fn seed(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }

    /// The corresponding public key.
    pub fn public_key(&self) -> IdentityPublicKey {
        IdentityPublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// Sign a message, returning the 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LEN] {
        self.signing_key.sign(message).to_bytes()
    }
}

/// Ed25519 public identity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityPublicKey {
    verifying_key: VerifyingKey,
}

impl IdentityPublicKey {
    /// Parse a public key from its 32-byte encoding.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidKey` if the bytes are not a valid curve point.
    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_LEN]) -> Result<Self> {
        let verifying_key = VerifyingKey::from_bytes(bytes)
            .map_err(|_| Error::InvalidKey("not a valid Ed25519 public key".into()))?;
        Ok(Self { verifying_key })
    }

    /// The 32-byte wire encoding.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LEN] {
        self.verifying_key.to_bytes()
    }

    /// Verify a signature over a message.
    ///
    /// # Errors
    ///
    /// Returns `Error::Signature` if verification fails.
    pub fn verify(&self, message: &[u8], signature: &[u8; SIGNATURE_LEN]) -> Result<()> {
        let signature = Signature::from_bytes(signature);
        self.verifying_key
            .verify(message, &signature)
            .map_err(|_| Error::Signature("Ed25519 signature verification failed".into()))
    }
}
