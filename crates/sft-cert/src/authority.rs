//! Certificate-issuing authority.

use crate::Certificate;
use sft_crypto::{IdentityKeyPair, IdentityPublicKey};

/// An issuing authority holding the trust root's signing key.
///
/// Both peers of a session must hold certificates issued by the same
/// authority; the verifier side needs only the authority public key (see
/// [`crate::TrustAnchor`]).
pub struct Authority {
    keypair: IdentityKeyPair,
}

impl Authority {
    /// Generate a fresh authority key pair.
    pub fn generate() -> Self {
        Self {
            keypair: IdentityKeyPair::generate(),
        }
    }

    /// Reconstruct an authority from its persisted 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            keypair: IdentityKeyPair::from_seed(seed),
        }
    }

    /// The authority key pair, for persisting the seed.
    pub fn keypair(&self) -> &IdentityKeyPair {
        &self.keypair
    }

    /// The public key peers use as their trust anchor.
    pub fn public_key(&self) -> IdentityPublicKey {
        self.keypair.public_key()
    }

    /// Issue a certificate binding `subject` to `subject_key`.
    ///
    /// `not_after` is the expiry in seconds since the Unix epoch.
    pub fn issue(
        &self,
        subject: &str,
        subject_key: &IdentityPublicKey,
        not_after: u64,
    ) -> Certificate {
        let content = Certificate::signed_content(subject, subject_key, not_after);
        let signature = self.keypair.sign(&content);
        Certificate::from_parts(subject.to_owned(), *subject_key, not_after, signature)
    }
}
