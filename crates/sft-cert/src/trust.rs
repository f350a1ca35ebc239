//! Trust validation against an authority public key.

use crate::{Certificate, Error, Result};
use sft_crypto::IdentityPublicKey;
use std::time::{SystemTime, UNIX_EPOCH};

/// The trust root a peer validates received certificates against.
#[derive(Debug, Clone, Copy)]
pub struct TrustAnchor {
    authority: IdentityPublicKey,
}

/// The outcome of successful validation: an identity the channel may rely on.
#[derive(Debug, Clone)]
pub struct ValidatedPeer {
    /// Subject name from the certificate.
    pub subject: String,
    /// The subject's identity key, usable for signature verification.
    pub public_key: IdentityPublicKey,
}

impl TrustAnchor {
    /// Create a trust anchor from the authority's public key.
    pub fn new(authority: IdentityPublicKey) -> Self {
        Self { authority }
    }

    /// Validate a certificate: authority signature, then expiry.
    ///
    /// # Errors
    ///
    /// `Error::Untrusted` if the signature does not verify against this
    /// anchor, `Error::Expired` if the validity period has ended.
    pub fn validate(&self, certificate: &Certificate) -> Result<ValidatedPeer> {
        self.validate_at(certificate, unix_now())
    }

    /// Validation with an explicit clock, for tests.
    pub fn validate_at(&self, certificate: &Certificate, now: u64) -> Result<ValidatedPeer> {
        let content = Certificate::signed_content(
            certificate.subject(),
            certificate.public_key(),
            certificate.not_after(),
        );
        self.authority
            .verify(&content, certificate.signature())
            .map_err(|_| Error::Untrusted)?;

        if now > certificate.not_after() {
            return Err(Error::Expired {
                not_after: certificate.not_after(),
                now,
            });
        }

        Ok(ValidatedPeer {
            subject: certificate.subject().to_owned(),
            public_key: *certificate.public_key(),
        })
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Authority;
    use sft_crypto::IdentityKeyPair;

    #[test]
    fn accepts_valid_certificate() {
        let authority = Authority::generate();
        let identity = IdentityKeyPair::generate();
        let cert = authority.issue("alice", &identity.public_key(), 2_000);

        let anchor = TrustAnchor::new(authority.public_key());
        let peer = anchor.validate_at(&cert, 1_000).unwrap();
        assert_eq!(peer.subject, "alice");
    }

    #[test]
    fn rejects_foreign_authority() {
        let authority = Authority::generate();
        let rogue = Authority::generate();
        let identity = IdentityKeyPair::generate();
        let cert = rogue.issue("alice", &identity.public_key(), 2_000);

        let anchor = TrustAnchor::new(authority.public_key());
        assert!(matches!(
            anchor.validate_at(&cert, 1_000),
            Err(Error::Untrusted)
        ));
    }

    #[test]
    fn rejects_expired_certificate() {
        let authority = Authority::generate();
        let identity = IdentityKeyPair::generate();
        let cert = authority.issue("alice", &identity.public_key(), 2_000);

        let anchor = TrustAnchor::new(authority.public_key());
        assert!(matches!(
            anchor.validate_at(&cert, 3_000),
            Err(Error::Expired { .. })
        ));
    }

    #[test]
    fn rejects_tampered_subject() {
        let authority = Authority::generate();
        let identity = IdentityKeyPair::generate();
        let cert = authority.issue("alice", &identity.public_key(), 2_000);

        // Re-encode with a different subject but the original signature.
        let mut bytes = cert.encode();
        // Subject starts after magic (4) + length (2); "alice" -> "alicf".
        bytes[10] ^= 0x02;
        let forged = Certificate::decode(&bytes).unwrap();

        let anchor = TrustAnchor::new(authority.public_key());
        assert!(matches!(
            anchor.validate_at(&forged, 1_000),
            Err(Error::Untrusted)
        ));
    }
}
