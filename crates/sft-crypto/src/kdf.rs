//! Session key derivation (HKDF-SHA256, RFC 5869).
//!
//! The handshake's Diffie-Hellman shared secret is expanded into two
//! directional traffic keys so that the two peers never encrypt under the
//! same (key, nonce) pair despite both using counter nonces starting at 0.

use crate::{Error, Result};
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Info string for session traffic key derivation.
const SESSION_KEYS_INFO: &[u8] = b"sft-session-keys";

/// Directional traffic keys: (client-to-server, server-to-client).
pub type DirectionalKeys = (Zeroizing<[u8; 32]>, Zeroizing<[u8; 32]>);

/// Generic HKDF-SHA256 derivation.
///
/// # Arguments
/// * `ikm` - Input key material
/// * `salt` - Salt value (empty slice for no salt)
/// * `info` - Context string
/// * `output_len` - Length of output key material
pub fn hkdf_sha256(
    ikm: &[u8],
    salt: &[u8],
    info: &[u8],
    output_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);

    let mut okm = vec![0u8; output_len];
    hk.expand(info, &mut okm)
        .map_err(|_| Error::KeyDerivation("HKDF expansion failed".into()))?;

    Ok(Zeroizing::new(okm))
}

/// Derive the directional session keys from a handshake shared secret.
///
/// Uses HKDF-SHA256 with:
/// - IKM: the X25519 shared secret
/// - Salt: `client_random || server_random`
/// - Info: `"sft-session-keys"`
/// - Length: 64 bytes (32 client-to-server + 32 server-to-client)
pub fn derive_session_keys(
    shared_secret: &[u8],
    client_random: &[u8; 32],
    server_random: &[u8; 32],
) -> Result<DirectionalKeys> {
    let mut salt = Vec::with_capacity(64);
    salt.extend_from_slice(client_random);
    salt.extend_from_slice(server_random);

    let okm = hkdf_sha256(shared_secret, &salt, SESSION_KEYS_INFO, 64)?;

    let mut client_to_server = Zeroizing::new([0u8; 32]);
    let mut server_to_client = Zeroizing::new([0u8; 32]);
    client_to_server.copy_from_slice(&okm[0..32]);
    server_to_client.copy_from_slice(&okm[32..64]);

    Ok((client_to_server, server_to_client))
}
