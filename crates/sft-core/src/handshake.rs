//! Session establishment: certificate exchange, key agreement, and mutual
//! authentication.
//!
//! Both roles drive the same three-step sequence over an unestablished
//! channel; the client sends first at every step:
//!
//! 1. Certificate exchange (raw): each side sends its encoded certificate
//!    and validates the peer's against the shared trust anchor.
//! 2. Key agreement (raw): each side sends `random(32) || x25519_pub(32)`,
//!    computes the Diffie-Hellman shared secret, and installs directional
//!    session keys bound to both randoms.
//! 3. Authentication (sealed): each side sends `token(32) || signature(64)`
//!    under the fresh session keys, signing the token together with the
//!    full key-agreement transcript. The peer's signature must verify
//!    against its certified identity key, and its token must differ from
//!    our own.
//!
//! Any failure moves the channel to [`Phase::Failed`] and discards all
//! intermediate key material; there is no retry on the same channel.

use crate::channel::{Phase, SecureChannel};
use crate::{Error, MessageTransport, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use sft_cert::{Certificate, TrustAnchor, ValidatedPeer};
use sft_crypto::kdf::derive_session_keys;
use sft_crypto::sign::SIGNATURE_LEN;
use sft_crypto::{EphemeralKeyPair, SessionCipher};
use tracing::{debug, info};

/// Length of a handshake random in bytes.
const RANDOM_LEN: usize = 32;

/// Length of an authentication token in bytes.
const TOKEN_LEN: usize = 32;

/// Wire length of a key-agreement message: `random || x25519_pub`.
const KEY_SHARE_LEN: usize = RANDOM_LEN + 32;

/// Plaintext length of an authentication message: `token || signature`.
const AUTH_MSG_LEN: usize = TOKEN_LEN + SIGNATURE_LEN;

/// What one endpoint brings to a handshake: its certificate and the
/// identity key the certificate binds to.
pub struct Credentials {
    /// Certificate issued by the shared authority.
    pub certificate: Certificate,
    /// Identity key pair matching the certificate's public key.
    pub identity: sft_crypto::IdentityKeyPair,
}

impl<T: MessageTransport> SecureChannel<T> {
    /// Run the handshake in the client role.
    ///
    /// On success the channel is [`Phase::Established`] and secure
    /// messaging is available. On any error the channel is
    /// [`Phase::Failed`] and must be discarded.
    ///
    /// # Errors
    ///
    /// [`Error::IdentityRejected`] if the server certificate does not
    /// validate, [`Error::AuthenticationFailed`] if its signature or
    /// freshness check fails, [`Error::PeerClosed`] if the server
    /// disconnects mid-handshake, [`Error::ProtocolViolation`] on
    /// malformed messages or if the channel is not fresh.
    pub fn establish_client(
        &mut self,
        credentials: &Credentials,
        anchor: &TrustAnchor,
    ) -> Result<()> {
        self.require_fresh()?;
        self.run_client(credentials, anchor).map_err(|e| {
            self.fail();
            e
        })
    }

    /// Run the handshake in the server role.
    ///
    /// Mirror image of [`establish_client`](Self::establish_client): the
    /// server receives first at every step.
    ///
    /// # Errors
    ///
    /// Same taxonomy as the client role.
    pub fn establish_server(
        &mut self,
        credentials: &Credentials,
        anchor: &TrustAnchor,
    ) -> Result<()> {
        self.require_fresh()?;
        self.run_server(credentials, anchor).map_err(|e| {
            self.fail();
            e
        })
    }

    fn require_fresh(&self) -> Result<()> {
        if self.phase() == Phase::Init {
            Ok(())
        } else {
            Err(Error::ProtocolViolation(
                "handshake already attempted on this channel".into(),
            ))
        }
    }

    fn run_client(&mut self, credentials: &Credentials, anchor: &TrustAnchor) -> Result<()> {
        debug!("starting handshake (client role)");

        // Step 1: certificates, ours first.
        self.send_raw(&credentials.certificate.encode())?;
        let peer_cert = self.recv_raw_required()?;
        let peer = validate_peer_certificate(&peer_cert, anchor)?;
        debug!(peer = %peer.subject, "peer certificate validated");
        self.set_peer(peer.clone());
        self.set_phase(Phase::CertsExchanged);

        // Step 2: key shares, ours first.
        let ephemeral = EphemeralKeyPair::generate();
        let client_random = fresh_random();
        self.send_raw(&key_share(&client_random, ephemeral.public_key()))?;

        let reply = self.recv_raw_required()?;
        let (server_random, server_public) = parse_key_share(&reply)?;
        let shared = ephemeral.exchange(&server_public)?;
        let (c2s, s2c) = derive_session_keys(&*shared, &client_random, &server_random)?;
        self.install_cipher(Box::new(SessionCipher::new(c2s, s2c)));
        self.set_phase(Phase::KeyAgreed);

        // Step 3: sealed authentication, ours first.
        let transcript = auth_transcript(
            &client_random,
            &server_random,
            ephemeral.public_key(),
            &server_public,
        );
        let token = fresh_random();
        self.send_sealed(&auth_message(&token, &credentials.identity, &transcript))?;

        let peer_auth = self.recv_sealed_required()?;
        verify_auth_message(&peer_auth, &peer.public_key, &transcript, &token)?;
        self.set_phase(Phase::Authenticated);

        self.set_phase(Phase::Established);
        info!(peer = %peer.subject, "session established (client role)");
        Ok(())
    }

    fn run_server(&mut self, credentials: &Credentials, anchor: &TrustAnchor) -> Result<()> {
        debug!("starting handshake (server role)");

        // Step 1: certificates, peer's first.
        let peer_cert = self.recv_raw_required()?;
        let peer = validate_peer_certificate(&peer_cert, anchor)?;
        debug!(peer = %peer.subject, "peer certificate validated");
        self.send_raw(&credentials.certificate.encode())?;
        self.set_peer(peer.clone());
        self.set_phase(Phase::CertsExchanged);

        // Step 2: key shares, peer's first.
        let hello = self.recv_raw_required()?;
        let (client_random, client_public) = parse_key_share(&hello)?;

        let ephemeral = EphemeralKeyPair::generate();
        let server_random = fresh_random();
        self.send_raw(&key_share(&server_random, ephemeral.public_key()))?;

        let shared = ephemeral.exchange(&client_public)?;
        let (c2s, s2c) = derive_session_keys(&*shared, &client_random, &server_random)?;
        self.install_cipher(Box::new(SessionCipher::new(s2c, c2s)));
        self.set_phase(Phase::KeyAgreed);

        // Step 3: sealed authentication, peer's first.
        let transcript = auth_transcript(
            &client_random,
            &server_random,
            &client_public,
            ephemeral.public_key(),
        );
        let token = fresh_random();

        let peer_auth = self.recv_sealed_required()?;
        verify_auth_message(&peer_auth, &peer.public_key, &transcript, &token)?;
        self.set_phase(Phase::Authenticated);

        self.send_sealed(&auth_message(&token, &credentials.identity, &transcript))?;
        self.set_phase(Phase::Established);
        info!(peer = %peer.subject, "session established (server role)");
        Ok(())
    }

    fn recv_raw_required(&mut self) -> Result<Vec<u8>> {
        self.recv_raw()?.ok_or(Error::PeerClosed)
    }

    fn recv_sealed_required(&mut self) -> Result<zeroize::Zeroizing<Vec<u8>>> {
        self.recv_sealed()?.ok_or(Error::PeerClosed)
    }
}

fn fresh_random() -> [u8; RANDOM_LEN] {
    let mut bytes = [0u8; RANDOM_LEN];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

fn validate_peer_certificate(bytes: &[u8], anchor: &TrustAnchor) -> Result<ValidatedPeer> {
    let certificate =
        Certificate::decode(bytes).map_err(|e| Error::IdentityRejected(e.to_string()))?;
    anchor
        .validate(&certificate)
        .map_err(|e| Error::IdentityRejected(e.to_string()))
}

fn key_share(random: &[u8; RANDOM_LEN], public: &[u8; 32]) -> Vec<u8> {
    let mut message = Vec::with_capacity(KEY_SHARE_LEN);
    message.extend_from_slice(random);
    message.extend_from_slice(public);
    message
}

fn parse_key_share(bytes: &[u8]) -> Result<([u8; RANDOM_LEN], [u8; 32])> {
    if bytes.len() != KEY_SHARE_LEN {
        return Err(Error::ProtocolViolation(format!(
            "key share must be {} bytes, got {}",
            KEY_SHARE_LEN,
            bytes.len()
        )));
    }

    let mut random = [0u8; RANDOM_LEN];
    let mut public = [0u8; 32];
    random.copy_from_slice(&bytes[..RANDOM_LEN]);
    public.copy_from_slice(&bytes[RANDOM_LEN..]);
    Ok((random, public))
}

/// The byte string both authentication signatures are bound to: every
/// value either side contributed to key agreement, in protocol order.
fn auth_transcript(
    client_random: &[u8; RANDOM_LEN],
    server_random: &[u8; RANDOM_LEN],
    client_public: &[u8; 32],
    server_public: &[u8; 32],
) -> Vec<u8> {
    let mut transcript = Vec::with_capacity(2 * RANDOM_LEN + 64);
    transcript.extend_from_slice(client_random);
    transcript.extend_from_slice(server_random);
    transcript.extend_from_slice(client_public);
    transcript.extend_from_slice(server_public);
    transcript
}

fn auth_message(
    token: &[u8; TOKEN_LEN],
    identity: &sft_crypto::IdentityKeyPair,
    transcript: &[u8],
) -> Vec<u8> {
    let mut signed = Vec::with_capacity(TOKEN_LEN + transcript.len());
    signed.extend_from_slice(token);
    signed.extend_from_slice(transcript);
    let signature = identity.sign(&signed);

    let mut message = Vec::with_capacity(AUTH_MSG_LEN);
    message.extend_from_slice(token);
    message.extend_from_slice(&signature);
    message
}

fn verify_auth_message(
    message: &[u8],
    peer_key: &sft_crypto::IdentityPublicKey,
    transcript: &[u8],
    own_token: &[u8; TOKEN_LEN],
) -> Result<()> {
    if message.len() != AUTH_MSG_LEN {
        return Err(Error::ProtocolViolation(format!(
            "authentication message must be {} bytes, got {}",
            AUTH_MSG_LEN,
            message.len()
        )));
    }

    let token = &message[..TOKEN_LEN];
    let mut signature = [0u8; SIGNATURE_LEN];
    signature.copy_from_slice(&message[TOKEN_LEN..]);

    // A token equal to our own is a reflection of our message, not a
    // fresh proof from the peer.
    if token == own_token {
        return Err(Error::AuthenticationFailed(
            "peer replayed our authentication token".into(),
        ));
    }

    let mut signed = Vec::with_capacity(TOKEN_LEN + transcript.len());
    signed.extend_from_slice(token);
    signed.extend_from_slice(transcript);
    peer_key
        .verify(&signed, &signature)
        .map_err(|_| Error::AuthenticationFailed("peer signature did not verify".into()))
}
