//! Error types for certificate operations.

use thiserror::Error;

/// Result type alias for certificate operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Certificate operation errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The certificate bytes could not be decoded.
    #[error("Malformed certificate: {0}")]
    Malformed(String),

    /// The authority signature does not verify against the trust anchor.
    #[error("Certificate not signed by the trusted authority")]
    Untrusted,

    /// The certificate validity period has ended.
    #[error("Certificate expired at {not_after} (now {now})")]
    Expired {
        /// Expiry instant, seconds since the Unix epoch.
        not_after: u64,
        /// Validation instant, seconds since the Unix epoch.
        now: u64,
    },

    /// The embedded public key is not a valid Ed25519 point.
    #[error("Invalid subject key: {0}")]
    InvalidKey(#[from] sft_crypto::Error),
}
