//! One server-side connection: handshake, then a command loop.
//!
//! Every accepted connection gets its own [`Connection`] owning its
//! channel and a handle to the storage directory; nothing about a session
//! lives in process-wide state. A connection's failure is reported to the
//! accept loop and never affects other connections.

use crate::commands::Command;
use crate::storage;
use sft_cert::TrustAnchor;
use sft_core::handshake::Credentials;
use sft_core::{Error, MessageTransport, Result, SecureChannel};
use std::fs::File;
use std::io::Cursor;
use std::path::PathBuf;
use tracing::info;

/// Server-side session over one accepted connection.
pub struct Connection<T: MessageTransport> {
    channel: SecureChannel<T>,
    storage: PathBuf,
}

impl<T: MessageTransport> Connection<T> {
    /// Run the server handshake over a fresh transport.
    ///
    /// # Errors
    ///
    /// Any handshake error; the transport is consumed either way.
    pub fn establish(
        transport: T,
        credentials: &Credentials,
        anchor: &TrustAnchor,
        storage: PathBuf,
    ) -> Result<Self> {
        let mut channel = SecureChannel::new(transport);
        channel.establish_server(credentials, anchor)?;
        Ok(Self { channel, storage })
    }

    /// The authenticated client's certificate subject.
    pub fn peer_subject(&self) -> &str {
        self.channel
            .peer()
            .map(|peer| peer.subject.as_str())
            .unwrap_or("<unknown>")
    }

    /// Serve commands until the client disconnects.
    ///
    /// Returns `Ok(())` on orderly disconnect. Any error ends the session;
    /// the caller closes the connection and keeps accepting others.
    pub fn serve(&mut self) -> Result<()> {
        loop {
            let line = match self.channel.recv_secure_msg()? {
                None => {
                    info!(peer = self.peer_subject(), "client disconnected");
                    return Ok(());
                }
                Some(line) => line,
            };

            let line = std::str::from_utf8(&line)
                .map_err(|_| Error::ProtocolViolation("command is not UTF-8".into()))?;
            let command = Command::parse(line).ok_or_else(|| {
                Error::ProtocolViolation(format!("unrecognized command line {line:?}"))
            })?;

            match command {
                Command::Upload(name) => self.handle_upload(&name)?,
                Command::List => self.handle_list()?,
                Command::Retrieve(name) => self.handle_retrieve(&name)?,
            }
        }
    }

    fn handle_upload(&mut self, name: &str) -> Result<()> {
        let path = storage::stored_path(&self.storage, name)
            .ok_or_else(|| Error::ProtocolViolation(format!("unsafe filename {name:?}")))?;

        let bytes = self.channel.receive_file(&path)?;
        info!(peer = self.peer_subject(), file = %path.display(), bytes, "upload stored");
        Ok(())
    }

    fn handle_list(&mut self) -> Result<()> {
        let listing = storage::build_listing(&self.storage)?;

        let total = listing.len() as u64;
        self.channel
            .send_source(&mut Cursor::new(listing.into_bytes()), total)?;
        info!(peer = self.peer_subject(), bytes = total, "listing sent");
        Ok(())
    }

    fn handle_retrieve(&mut self, name: &str) -> Result<()> {
        let path = storage::stored_path(&self.storage, name)
            .ok_or_else(|| Error::ProtocolViolation(format!("unsafe filename {name:?}")))?;

        let mut file = File::open(&path).map_err(|e| {
            Error::ResourceUnavailable(format!("cannot open {}: {}", path.display(), e))
        })?;
        let bytes = self.channel.send_file(&mut file)?;
        info!(peer = self.peer_subject(), file = %path.display(), bytes, "file sent");
        Ok(())
    }
}
