//! The secure channel: one per established connection.
//!
//! A channel exclusively owns its transport handle for its whole lifetime
//! and, once the handshake completes, the session cipher derived for this
//! connection. All protocol-level state (handshake phase, validated peer,
//! transfer accounting) lives here and nowhere else.

use crate::{Error, MessageTransport, Result};
use crate::traits::EnvelopeCipher;
use sft_cert::ValidatedPeer;
use tracing::warn;
use zeroize::Zeroizing;

/// Handshake phase marker. Transitions are monotonic; `Failed` is terminal
/// and reachable from any non-terminal state. There is no renegotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No handshake step has run.
    Init,
    /// Certificates exchanged and validated in both directions.
    CertsExchanged,
    /// Shared session keys derived and installed.
    KeyAgreed,
    /// The peer's authentication message has been verified.
    Authenticated,
    /// Both directions authenticated; application data may flow.
    Established,
    /// The handshake aborted. The channel is unusable.
    Failed,
}

/// The core session object mediating all secure communication on one
/// connection.
pub struct SecureChannel<T: MessageTransport> {
    transport: T,
    cipher: Option<Box<dyn EnvelopeCipher>>,
    peer: Option<ValidatedPeer>,
    phase: Phase,
}

impl<T: MessageTransport> SecureChannel<T> {
    /// Wrap a transport in a fresh, unestablished channel.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            cipher: None,
            peer: None,
            phase: Phase::Init,
        }
    }

    /// Build an already-established channel from an externally produced
    /// cipher. This is the seam for swapping crypto backends and for
    /// driving the transfer machinery with fakes in tests; production
    /// channels go through [`establish_client`](Self::establish_client) /
    /// [`establish_server`](Self::establish_server) instead.
    pub fn from_established(
        transport: T,
        cipher: Box<dyn EnvelopeCipher>,
        peer: Option<ValidatedPeer>,
    ) -> Self {
        Self {
            transport,
            cipher: Some(cipher),
            peer,
            phase: Phase::Established,
        }
    }

    /// Current handshake phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the handshake has completed successfully.
    pub fn is_established(&self) -> bool {
        self.phase == Phase::Established
    }

    /// The validated peer identity, available once certificates have been
    /// exchanged.
    pub fn peer(&self) -> Option<&ValidatedPeer> {
        self.peer.as_ref()
    }

    /// Seal one plaintext message and deliver it as one discrete message.
    ///
    /// # Errors
    ///
    /// [`Error::NotEstablished`] before the handshake completes; transport
    /// and cipher faults are terminal for the channel.
    pub fn send_secure_msg(&mut self, plaintext: &[u8]) -> Result<()> {
        self.ensure_established()?;
        self.send_sealed(plaintext)
    }

    /// Receive one discrete message and open it.
    ///
    /// Three outcomes every caller must distinguish:
    /// - `Ok(None)`: the peer closed in an orderly way; no data, no fault.
    /// - `Err(IntegrityFailure)`: the envelope did not verify; no
    ///   plaintext is released.
    /// - `Ok(Some(p))`: success; the caller owns `p`, which is zeroized
    ///   on drop.
    pub fn recv_secure_msg(&mut self) -> Result<Option<Zeroizing<Vec<u8>>>> {
        self.ensure_established()?;
        self.recv_sealed()
    }

    fn ensure_established(&self) -> Result<()> {
        if self.phase == Phase::Established {
            Ok(())
        } else {
            Err(Error::NotEstablished)
        }
    }

    // === Internal plumbing shared with the handshake module ===

    pub(crate) fn send_sealed(&mut self, plaintext: &[u8]) -> Result<()> {
        let cipher = self.cipher.as_mut().ok_or(Error::NotEstablished)?;
        let envelope = cipher.seal(plaintext)?;
        self.transport.send_msg(&envelope)?;
        Ok(())
    }

    pub(crate) fn recv_sealed(&mut self) -> Result<Option<Zeroizing<Vec<u8>>>> {
        let envelope = match self.transport.recv_msg()? {
            None => return Ok(None),
            Some(envelope) => envelope,
        };

        let cipher = self.cipher.as_mut().ok_or(Error::NotEstablished)?;
        match cipher.open(&envelope) {
            Ok(plaintext) => Ok(Some(plaintext)),
            Err(e) => {
                warn!(envelope_len = envelope.len(), "rejected incoming envelope");
                Err(e)
            }
        }
    }

    /// Raw transport send, used only by pre-key handshake steps.
    pub(crate) fn send_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.transport.send_msg(bytes)?;
        Ok(())
    }

    /// Raw transport receive, used only by pre-key handshake steps.
    pub(crate) fn recv_raw(&mut self) -> Result<Option<Vec<u8>>> {
        Ok(self.transport.recv_msg()?)
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn set_peer(&mut self, peer: ValidatedPeer) {
        self.peer = Some(peer);
    }

    pub(crate) fn install_cipher(&mut self, cipher: Box<dyn EnvelopeCipher>) {
        self.cipher = Some(cipher);
    }

    /// Mark the handshake failed and discard any intermediate key material.
    pub(crate) fn fail(&mut self) {
        self.phase = Phase::Failed;
        self.cipher = None;
    }
}
