//! Credential files on disk.
//!
//! An identity directory holds the authority key pair and one seed/cert
//! pair per provisioned subject, all as raw binary files:
//!
//! - `authority.seed` — authority signing seed (32 bytes, mode 0600)
//! - `authority.pub` — authority public key (32 bytes); this is the trust
//!   anchor every peer needs
//! - `<name>.seed` — subject identity seed (32 bytes, mode 0600)
//! - `<name>.cert` — subject certificate issued by the authority

use anyhow::{bail, Context, Result};
use sft_cert::{Authority, Certificate, TrustAnchor};
use sft_core::handshake::Credentials;
use sft_crypto::IdentityKeyPair;
use std::fs;
use std::path::Path;
use tracing::info;

const AUTHORITY_SEED: &str = "authority.seed";
const AUTHORITY_PUB: &str = "authority.pub";

/// Create an identity directory: a fresh authority plus credentials for
/// each subject, valid until `not_after` (Unix seconds).
pub fn provision(dir: &Path, subjects: &[&str], not_after: u64) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("cannot create identity dir {}", dir.display()))?;

    let authority = Authority::generate();
    write_secret(&dir.join(AUTHORITY_SEED), &*authority.keypair().seed())?;
    fs::write(dir.join(AUTHORITY_PUB), authority.public_key().to_bytes())?;
    info!(
        authority = %hex::encode(authority.public_key().to_bytes()),
        "authority generated"
    );

    for &subject in subjects {
        let identity = IdentityKeyPair::generate();
        let certificate = authority.issue(subject, &identity.public_key(), not_after);

        write_secret(&dir.join(format!("{subject}.seed")), &*identity.seed())?;
        fs::write(dir.join(format!("{subject}.cert")), certificate.encode())?;
        info!(subject, "credentials issued");
    }

    Ok(())
}

/// Load the trust anchor from an identity directory.
pub fn load_trust_anchor(dir: &Path) -> Result<TrustAnchor> {
    let path = dir.join(AUTHORITY_PUB);
    let bytes = read_exactly_32(&path)?;
    let public_key = sft_crypto::IdentityPublicKey::from_bytes(&bytes)
        .with_context(|| format!("{} is not a valid public key", path.display()))?;
    Ok(TrustAnchor::new(public_key))
}

/// Load one subject's credentials from an identity directory.
pub fn load_credentials(dir: &Path, subject: &str) -> Result<Credentials> {
    let seed = read_exactly_32(&dir.join(format!("{subject}.seed")))?;
    let identity = IdentityKeyPair::from_seed(&seed);

    let cert_path = dir.join(format!("{subject}.cert"));
    let cert_bytes = fs::read(&cert_path)
        .with_context(|| format!("cannot read {}", cert_path.display()))?;
    let certificate = Certificate::decode(&cert_bytes)
        .with_context(|| format!("{} is not a valid certificate", cert_path.display()))?;

    if *certificate.public_key() != identity.public_key() {
        bail!("certificate for '{subject}' does not match its seed");
    }

    Ok(Credentials {
        certificate,
        identity,
    })
}

fn read_exactly_32(path: &Path) -> Result<[u8; 32]> {
    let bytes = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("{} must be exactly 32 bytes", path.display()))
}

fn write_secret(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("cannot write {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}
