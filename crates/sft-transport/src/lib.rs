//! Transport backend for the sft session protocol.
//!
//! Provides the discrete-message delivery the channel core consumes
//! through [`sft_core::MessageTransport`]: blocking TCP with a 4-byte
//! length prefix per message. One connection carries one session; a
//! concurrent server accepts multiple connections and gives each its own
//! stream and channel.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod tcp;

pub use error::{Error, Result};
pub use tcp::{TcpMessageListener, TcpMessageStream};
