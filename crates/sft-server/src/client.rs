//! Client-side requests against a file server.

use crate::commands::Command;
use anyhow::{Context, Result};
use sft_core::{MessageTransport, SecureChannel};
use std::fs::File;
use std::path::Path;

/// Upload a local file under its own file name.
///
/// Returns the number of bytes sent.
pub fn put<T: MessageTransport>(channel: &mut SecureChannel<T>, local: &Path) -> Result<u64> {
    let name = local
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("{} has no usable file name", local.display()))?;

    let mut file =
        File::open(local).with_context(|| format!("cannot open {}", local.display()))?;

    channel.send_secure_msg(Command::Upload(name.to_owned()).to_line().as_bytes())?;
    Ok(channel.send_file(&mut file)?)
}

/// Fetch the server's storage listing.
pub fn list<T: MessageTransport>(channel: &mut SecureChannel<T>) -> Result<String> {
    channel.send_secure_msg(Command::List.to_line().as_bytes())?;

    let mut listing = Vec::new();
    channel.receive_streamed(&mut listing)?;
    String::from_utf8(listing).context("server listing is not UTF-8")
}

/// Download a stored file to a local path.
///
/// Returns the number of bytes received.
pub fn get<T: MessageTransport>(
    channel: &mut SecureChannel<T>,
    name: &str,
    dest: &Path,
) -> Result<u64> {
    channel.send_secure_msg(Command::Retrieve(name.to_owned()).to_line().as_bytes())?;
    channel
        .receive_file(dest)
        .with_context(|| format!("transfer of {name:?} failed (does it exist on the server?)"))
}
