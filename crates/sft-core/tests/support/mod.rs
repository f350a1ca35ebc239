//! In-memory transports for exercising channels across threads.

#![allow(dead_code)]

use sft_core::MessageTransport;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// One endpoint of a bidirectional in-memory message pipe.
///
/// Dropping an endpoint hangs up: the peer's next receive reports an
/// orderly close.
pub struct PipeTransport {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
}

/// Create two connected pipe endpoints.
pub fn pipe_pair() -> (PipeTransport, PipeTransport) {
    let (a_tx, b_rx) = channel();
    let (b_tx, a_rx) = channel();
    (
        PipeTransport { tx: a_tx, rx: a_rx },
        PipeTransport { tx: b_tx, rx: b_rx },
    )
}

impl MessageTransport for PipeTransport {
    fn send_msg(&mut self, bytes: &[u8]) -> io::Result<()> {
        // A hung-up peer discards writes, as a socket buffer would; the
        // close is observed on the next receive.
        let _ = self.tx.send(bytes.to_vec());
        Ok(())
    }

    fn recv_msg(&mut self) -> io::Result<Option<Vec<u8>>> {
        match self.rx.recv() {
            Ok(message) => Ok(Some(message)),
            // All senders gone: the peer hung up.
            Err(_) => Ok(None),
        }
    }
}

/// Transport wrapper counting messages in each direction.
pub struct CountingTransport<T> {
    inner: T,
    sent: Arc<AtomicUsize>,
    received: Arc<AtomicUsize>,
}

impl<T> CountingTransport<T> {
    pub fn new(inner: T) -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let sent = Arc::new(AtomicUsize::new(0));
        let received = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner,
                sent: Arc::clone(&sent),
                received: Arc::clone(&received),
            },
            sent,
            received,
        )
    }
}

impl<T: MessageTransport> MessageTransport for CountingTransport<T> {
    fn send_msg(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.send_msg(bytes)?;
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn recv_msg(&mut self) -> io::Result<Option<Vec<u8>>> {
        let message = self.inner.recv_msg()?;
        if message.is_some() {
            self.received.fetch_add(1, Ordering::SeqCst);
        }
        Ok(message)
    }
}

/// Transport wrapper flipping one bit in the Nth outgoing message.
pub struct TamperTransport<T> {
    inner: T,
    tamper_index: usize,
    sent: usize,
}

impl<T> TamperTransport<T> {
    pub fn new(inner: T, tamper_index: usize) -> Self {
        Self {
            inner,
            tamper_index,
            sent: 0,
        }
    }
}

impl<T: MessageTransport> MessageTransport for TamperTransport<T> {
    fn send_msg(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut bytes = bytes.to_vec();
        if self.sent == self.tamper_index && !bytes.is_empty() {
            bytes[0] ^= 0x01;
        }
        self.sent += 1;
        self.inner.send_msg(&bytes)
    }

    fn recv_msg(&mut self) -> io::Result<Option<Vec<u8>>> {
        self.inner.recv_msg()
    }
}
