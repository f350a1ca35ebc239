//! Error types for cryptographic operations.

use thiserror::Error;

/// Result type alias for cryptographic operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Encryption failed.
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Decryption or tag verification failed. The envelope is not trusted.
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Key exchange failed.
    #[error("Key exchange failed: {0}")]
    KeyExchange(String),

    /// Key derivation failed.
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// Signature creation or verification failed.
    #[error("Signature error: {0}")]
    Signature(String),

    /// Key material is malformed (wrong length or invalid encoding).
    #[error("Invalid key material: {0}")]
    InvalidKey(String),
}
