//! Error taxonomy for channel operations.
//!
//! One closed enum covers every failure kind a channel operation can
//! report. `PeerClosed` is the only variant callers routinely recover
//! from: it marks an orderly shutdown of the remote side, not a fault.
//! Everything else is terminal for the channel that produced it.

use thiserror::Error;

/// Result type alias for channel operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Channel operation errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The peer closed the connection in an orderly way. Recovered by the
    /// caller as normal termination of the current operation.
    #[error("Peer closed the connection")]
    PeerClosed,

    /// An envelope failed decryption or authentication, or the peer
    /// reported the same about one of ours. Security event; the associated
    /// plaintext is never released.
    #[error("Envelope failed integrity verification")]
    IntegrityFailure,

    /// The peer certificate failed trust validation.
    #[error("Peer identity rejected: {0}")]
    IdentityRejected(String),

    /// A handshake signature or freshness check failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The peer sent a malformed or out-of-sequence message.
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// A local file or storage location could not be opened.
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// A messaging or transfer operation was invoked before the handshake
    /// reached `Established`. Contract violation by the caller.
    #[error("Channel is not established")]
    NotEstablished,

    /// Cryptographic failure outside envelope verification.
    #[error("Crypto error: {0}")]
    Crypto(#[from] sft_crypto::Error),

    /// Transport I/O fault. Terminal for the channel.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
