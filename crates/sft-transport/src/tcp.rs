//! Blocking TCP message stream with length-prefixed framing.
//!
//! Each message travels as a 4-byte little-endian length followed by that
//! many payload bytes, preserving the message boundaries the channel core
//! relies on. A clean close between frames surfaces as `Ok(None)`; a close
//! in the middle of a frame is an I/O error.

use crate::{Error, Result};
use sft_core::MessageTransport;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use tracing::debug;

/// Upper bound on a single framed message.
///
/// Generously above anything the protocol produces (the largest regular
/// message is a transfer chunk plus AEAD overhead); a prefix beyond this
/// is treated as a corrupt or hostile stream.
pub const MAX_MESSAGE_LEN: usize = 1 << 20;

/// One TCP connection carrying framed messages.
pub struct TcpMessageStream {
    stream: TcpStream,
}

impl TcpMessageStream {
    /// Connect to a remote endpoint.
    ///
    /// # Errors
    ///
    /// [`Error::ConnectionFailed`] if the address does not resolve or the
    /// connection is refused.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| Error::ConnectionFailed(e.to_string()))?;
        stream.set_nodelay(true)?;
        debug!(peer = ?stream.peer_addr().ok(), "connected");
        Ok(Self { stream })
    }

    /// Wrap an already-connected stream, typically from an accept loop.
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }

    /// The remote endpoint's address.
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.stream.peer_addr()
    }
}

impl MessageTransport for TcpMessageStream {
    fn send_msg(&mut self, bytes: &[u8]) -> io::Result<()> {
        if bytes.len() > MAX_MESSAGE_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("message of {} bytes exceeds frame limit", bytes.len()),
            ));
        }
        let prefix = (bytes.len() as u32).to_le_bytes();

        self.stream.write_all(&prefix)?;
        self.stream.write_all(bytes)?;
        self.stream.flush()
    }

    fn recv_msg(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut prefix = [0u8; 4];
        let mut filled = 0;
        while filled < prefix.len() {
            let n = self.stream.read(&mut prefix[filled..])?;
            if n == 0 {
                if filled == 0 {
                    // Clean close on a frame boundary.
                    return Ok(None);
                }
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed inside a frame header",
                ));
            }
            filled += n;
        }

        let len = u32::from_le_bytes(prefix) as usize;
        if len > MAX_MESSAGE_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("frame of {} bytes exceeds limit", len),
            ));
        }

        let mut payload = vec![0u8; len];
        self.stream.read_exact(&mut payload)?;
        Ok(Some(payload))
    }
}

/// Listening socket producing framed message streams.
pub struct TcpMessageListener {
    listener: TcpListener,
}

impl TcpMessageListener {
    /// Bind a listening socket.
    ///
    /// # Errors
    ///
    /// [`Error::BindFailed`] if the address is unavailable.
    pub fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let listener =
            TcpListener::bind(addr).map_err(|e| Error::BindFailed(e.to_string()))?;
        debug!(addr = ?listener.local_addr().ok(), "listening");
        Ok(Self { listener })
    }

    /// The bound local address, useful when binding port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Block until the next connection arrives.
    pub fn accept(&self) -> Result<(TcpMessageStream, SocketAddr)> {
        let (stream, addr) = self.listener.accept()?;
        Ok((TcpMessageStream::from_stream(stream)?, addr))
    }
}
