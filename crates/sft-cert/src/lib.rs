//! Certificate capability for the sft session protocol.
//!
//! Certificates bind a subject name to an Ed25519 identity key, carry an
//! expiry, and are signed by a shared authority. The channel core consumes
//! this crate only through [`Certificate`] encode/decode and
//! [`TrustAnchor::validate`]; the wire format is private to this crate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod authority;
pub mod certificate;
pub mod error;
pub mod trust;

pub use authority::Authority;
pub use certificate::Certificate;
pub use error::{Error, Result};
pub use trust::{TrustAnchor, ValidatedPeer};
