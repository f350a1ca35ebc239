//! Transport layer errors.

use thiserror::Error;

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;

/// Transport errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection to the remote endpoint failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The listening socket could not be set up.
    #[error("Bind failed: {0}")]
    BindFailed(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
