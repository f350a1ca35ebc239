//! Certificate wire encoding.
//!
//! Layout (all multi-byte integers little-endian):
//!
//! ```text
//! magic (4) || subject_len (2) || subject (n) ||
//! public_key (32) || not_after (8) || signature (64)
//! ```
//!
//! The authority signature covers everything between the magic and the
//! signature field.

use crate::{Error, Result};
use sft_crypto::sign::{IdentityPublicKey, PUBLIC_KEY_LEN, SIGNATURE_LEN};

/// Certificate magic number (0x53465443 = "SFTC").
const MAGIC: u32 = 0x5346_5443;

/// Longest accepted subject name, in bytes.
const MAX_SUBJECT_LEN: usize = 255;

/// A subject identity certificate signed by an authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    subject: String,
    public_key: IdentityPublicKey,
    not_after: u64,
    signature: [u8; SIGNATURE_LEN],
}

impl Certificate {
    /// Assemble a certificate from its fields. Issuance lives in
    /// [`crate::Authority::issue`]; this is the raw constructor it uses.
    pub(crate) fn from_parts(
        subject: String,
        public_key: IdentityPublicKey,
        not_after: u64,
        signature: [u8; SIGNATURE_LEN],
    ) -> Self {
        Self {
            subject,
            public_key,
            not_after,
            signature,
        }
    }

    /// The subject name this certificate attests.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The subject's Ed25519 identity key.
    pub fn public_key(&self) -> &IdentityPublicKey {
        &self.public_key
    }

    /// Expiry, seconds since the Unix epoch.
    pub fn not_after(&self) -> u64 {
        self.not_after
    }

    /// The authority signature over the signed content.
    pub fn signature(&self) -> &[u8; SIGNATURE_LEN] {
        &self.signature
    }

    /// The byte string the authority signs.
    pub(crate) fn signed_content(
        subject: &str,
        public_key: &IdentityPublicKey,
        not_after: u64,
    ) -> Vec<u8> {
        let subject_bytes = subject.as_bytes();
        let mut content = Vec::with_capacity(2 + subject_bytes.len() + PUBLIC_KEY_LEN + 8);
        content.extend_from_slice(&(subject_bytes.len() as u16).to_le_bytes());
        content.extend_from_slice(subject_bytes);
        content.extend_from_slice(&public_key.to_bytes());
        content.extend_from_slice(&not_after.to_le_bytes());
        content
    }

    /// Encode for transmission.
    pub fn encode(&self) -> Vec<u8> {
        let content = Self::signed_content(&self.subject, &self.public_key, self.not_after);
        let mut bytes = Vec::with_capacity(4 + content.len() + SIGNATURE_LEN);
        bytes.extend_from_slice(&MAGIC.to_le_bytes());
        bytes.extend_from_slice(&content);
        bytes.extend_from_slice(&self.signature);
        bytes
    }

    /// Decode a received certificate.
    ///
    /// # Errors
    ///
    /// Returns `Error::Malformed` on any structural problem and
    /// `Error::InvalidKey` if the embedded key is not a valid point.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);

        let magic = u32::from_le_bytes(cursor.take::<4>()?);
        if magic != MAGIC {
            return Err(Error::Malformed(format!(
                "bad magic 0x{magic:08x}, expected 0x{MAGIC:08x}"
            )));
        }

        let subject_len = u16::from_le_bytes(cursor.take::<2>()?) as usize;
        if subject_len == 0 || subject_len > MAX_SUBJECT_LEN {
            return Err(Error::Malformed(format!(
                "subject length {subject_len} out of range"
            )));
        }
        let subject = String::from_utf8(cursor.take_slice(subject_len)?.to_vec())
            .map_err(|_| Error::Malformed("subject is not valid UTF-8".into()))?;

        let public_key = IdentityPublicKey::from_bytes(&cursor.take::<PUBLIC_KEY_LEN>()?)?;
        let not_after = u64::from_le_bytes(cursor.take::<8>()?);
        let signature = cursor.take::<SIGNATURE_LEN>()?;

        if !cursor.is_empty() {
            return Err(Error::Malformed("trailing bytes after signature".into()));
        }

        Ok(Self {
            subject,
            public_key,
            not_after,
            signature,
        })
    }
}

/// Minimal bounds-checked reader over a byte slice.
struct Cursor<'a> {
    bytes: &'a [u8],
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let slice = self.take_slice(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn take_slice(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.bytes.len() < n {
            return Err(Error::Malformed(format!(
                "truncated: need {n} more bytes, have {}",
                self.bytes.len()
            )));
        }
        let (head, tail) = self.bytes.split_at(n);
        self.bytes = tail;
        Ok(head)
    }

    fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Authority;

    #[test]
    fn encode_decode_roundtrip() {
        let authority = Authority::generate();
        let identity = sft_crypto::IdentityKeyPair::generate();
        let cert = authority.issue("alice", &identity.public_key(), 4_000_000_000);

        let decoded = Certificate::decode(&cert.encode()).unwrap();
        assert_eq!(decoded, cert);
        assert_eq!(decoded.subject(), "alice");
        assert_eq!(decoded.not_after(), 4_000_000_000);
    }

    #[test]
    fn rejects_bad_magic() {
        let authority = Authority::generate();
        let identity = sft_crypto::IdentityKeyPair::generate();
        let mut bytes = authority
            .issue("alice", &identity.public_key(), 4_000_000_000)
            .encode();
        bytes[0] ^= 0xFF;

        assert!(matches!(
            Certificate::decode(&bytes),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn rejects_truncation() {
        let authority = Authority::generate();
        let identity = sft_crypto::IdentityKeyPair::generate();
        let bytes = authority
            .issue("alice", &identity.public_key(), 4_000_000_000)
            .encode();

        for len in 0..bytes.len() {
            assert!(
                Certificate::decode(&bytes[..len]).is_err(),
                "accepted a {len}-byte prefix"
            );
        }
    }

    #[test]
    fn rejects_trailing_bytes() {
        let authority = Authority::generate();
        let identity = sft_crypto::IdentityKeyPair::generate();
        let mut bytes = authority
            .issue("alice", &identity.public_key(), 4_000_000_000)
            .encode();
        bytes.push(0);

        assert!(Certificate::decode(&bytes).is_err());
    }

    #[test]
    fn rejects_empty_subject() {
        // Hand-build a certificate with a zero-length subject.
        let identity = sft_crypto::IdentityKeyPair::generate();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(&identity.public_key().to_bytes());
        bytes.extend_from_slice(&0u64.to_le_bytes());
        bytes.extend_from_slice(&[0u8; SIGNATURE_LEN]);

        assert!(matches!(
            Certificate::decode(&bytes),
            Err(Error::Malformed(_))
        ));
    }
}
