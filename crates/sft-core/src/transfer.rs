//! Chunked bulk transfer with stop-and-wait acknowledgment.
//!
//! A transfer is a sequence of secure messages on an established channel:
//! one size announcement (the total byte count in decimal ASCII), then one
//! message per chunk, each acknowledged by the receiver before the next
//! chunk is sent. The announced total is authoritative: both sides stop
//! exactly when that many payload bytes have moved, and a zero-byte
//! transfer is the announcement alone.
//!
//! A receiver that cannot verify a chunk replies with [`NAK_TOKEN`] instead
//! of [`ACK_TOKEN`] and abandons the transfer without writing the chunk;
//! the sender surfaces that as [`Error::IntegrityFailure`].

use crate::channel::SecureChannel;
use crate::{Error, MessageTransport, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::debug;

/// Maximum payload bytes carried by one chunk message.
pub const CHUNK_SIZE: usize = 4096;

/// Positive acknowledgment payload.
pub const ACK_TOKEN: &[u8] = b"OK";

/// Negative acknowledgment payload: the receiver rejected the chunk.
pub const NAK_TOKEN: &[u8] = b"ERR";

impl<T: MessageTransport> SecureChannel<T> {
    /// Send an open file over the channel.
    ///
    /// The file's length is measured by seeking to its end, then the file
    /// is rewound and streamed from the start.
    ///
    /// # Errors
    ///
    /// See [`send_source`](Self::send_source); seek failures surface as
    /// [`Error::Io`].
    pub fn send_file(&mut self, file: &mut File) -> Result<u64> {
        let total = file.seek(SeekFrom::End(0))?;
        file.seek(SeekFrom::Start(0))?;
        self.send_source(file, total)
    }

    /// Send exactly `total` bytes from a reader over the channel.
    ///
    /// Announces `total`, then sends full chunks of [`CHUNK_SIZE`] bytes
    /// (the last possibly shorter) and waits for the receiver's
    /// acknowledgment after each one. Returns the number of payload bytes
    /// sent, which equals `total` on success.
    ///
    /// # Errors
    ///
    /// [`Error::IntegrityFailure`] if the receiver rejects a chunk,
    /// [`Error::PeerClosed`] if it disconnects mid-transfer,
    /// [`Error::ProtocolViolation`] on an unrecognized acknowledgment,
    /// [`Error::Io`] if the reader cannot supply the declared bytes.
    pub fn send_source<R: Read>(&mut self, reader: &mut R, total: u64) -> Result<u64> {
        debug!(total, "announcing transfer");
        self.send_secure_msg(format_announcement(total).as_bytes())?;

        let mut remaining = total;
        let mut chunk = vec![0u8; CHUNK_SIZE];
        while remaining > 0 {
            let len = CHUNK_SIZE.min(remaining as usize);
            reader.read_exact(&mut chunk[..len])?;

            self.send_secure_msg(&chunk[..len])?;
            self.await_ack()?;
            remaining -= len as u64;
        }

        debug!(total, "transfer sent");
        Ok(total)
    }

    /// Receive a transfer into a file created at `path`.
    ///
    /// The size announcement is received and parsed before the file is
    /// created, so a malformed transfer leaves the filesystem untouched.
    ///
    /// # Errors
    ///
    /// [`Error::ResourceUnavailable`] if the file cannot be created; see
    /// [`receive_streamed`](Self::receive_streamed) for the rest.
    pub fn receive_file(&mut self, path: &Path) -> Result<u64> {
        let total = self.recv_announcement()?;

        let mut file = File::create(path).map_err(|e| {
            Error::ResourceUnavailable(format!("cannot create {}: {}", path.display(), e))
        })?;
        self.receive_chunks(&mut file, total)
    }

    /// Receive a transfer into an arbitrary writer.
    ///
    /// Returns the number of payload bytes written, which equals the
    /// announced total on success.
    ///
    /// # Errors
    ///
    /// [`Error::IntegrityFailure`] if a chunk fails verification (a
    /// negative acknowledgment is sent and nothing is written for that
    /// chunk), [`Error::PeerClosed`] if the sender disconnects before the
    /// announced total arrives, [`Error::ProtocolViolation`] on a
    /// malformed announcement, an empty chunk, or more payload than
    /// announced.
    pub fn receive_streamed<W: Write>(&mut self, sink: &mut W) -> Result<u64> {
        let total = self.recv_announcement()?;
        self.receive_chunks(sink, total)
    }

    fn recv_announcement(&mut self) -> Result<u64> {
        let message = self.recv_secure_msg()?.ok_or(Error::PeerClosed)?;
        let total = parse_announcement(&message)?;
        debug!(total, "transfer announced");
        Ok(total)
    }

    fn receive_chunks<W: Write>(&mut self, sink: &mut W, total: u64) -> Result<u64> {
        let mut received = 0u64;
        while received < total {
            let chunk = match self.recv_secure_msg() {
                Ok(Some(chunk)) => chunk,
                Ok(None) => return Err(Error::PeerClosed),
                Err(Error::IntegrityFailure) => {
                    // Reject the chunk and abandon the transfer; the
                    // rejected bytes never reach the sink.
                    self.send_secure_msg(NAK_TOKEN)?;
                    return Err(Error::IntegrityFailure);
                }
                Err(e) => return Err(e),
            };

            // An empty chunk would never advance the count.
            if chunk.is_empty() {
                return Err(Error::ProtocolViolation("empty transfer chunk".into()));
            }
            let remaining = total - received;
            if chunk.len() as u64 > remaining {
                return Err(Error::ProtocolViolation(format!(
                    "chunk of {} bytes exceeds remaining {}",
                    chunk.len(),
                    remaining
                )));
            }

            sink.write_all(&chunk)?;
            self.send_secure_msg(ACK_TOKEN)?;
            received += chunk.len() as u64;
        }

        sink.flush()?;
        debug!(total, "transfer received");
        Ok(received)
    }

    fn await_ack(&mut self) -> Result<()> {
        let reply = self.recv_secure_msg()?.ok_or(Error::PeerClosed)?;
        if &*reply == ACK_TOKEN {
            Ok(())
        } else if &*reply == NAK_TOKEN {
            Err(Error::IntegrityFailure)
        } else {
            Err(Error::ProtocolViolation(format!(
                "unrecognized acknowledgment of {} bytes",
                reply.len()
            )))
        }
    }
}

fn format_announcement(total: u64) -> String {
    total.to_string()
}

fn parse_announcement(message: &[u8]) -> Result<u64> {
    std::str::from_utf8(message)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| Error::ProtocolViolation("malformed size announcement".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn announcement_roundtrip() {
        for total in [0u64, 1, 4096, 10_000, u64::MAX] {
            let wire = format_announcement(total);
            assert_eq!(parse_announcement(wire.as_bytes()).unwrap(), total);
        }
    }

    #[test]
    fn malformed_announcements_rejected() {
        for bad in [&b""[..], b"-1", b"12x", b" 12", b"12 ", b"\xff\xfe"] {
            assert!(
                matches!(parse_announcement(bad), Err(Error::ProtocolViolation(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn overlong_announcement_rejected() {
        // One past u64::MAX.
        assert!(parse_announcement(b"18446744073709551616").is_err());
    }
}
