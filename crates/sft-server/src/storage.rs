//! Storage directory handling: filename sanitation and listings.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Reduce a client-supplied filename to a bare final path component.
///
/// Anything that is not a plain name (separators, `..`, empty input)
/// is rejected so a command can never address files outside the storage
/// directory.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let path = Path::new(name);
    let mut components = path.components();

    match (components.next(), components.next()) {
        (Some(Component::Normal(component)), None) => {
            component.to_str().map(str::to_owned)
        }
        _ => None,
    }
}

/// Resolve a client-supplied filename inside the storage directory.
pub fn stored_path(storage: &Path, name: &str) -> Option<PathBuf> {
    sanitize_filename(name).map(|safe| storage.join(safe))
}

/// Build the listing text for the storage directory: one
/// `name - size Bytes` line per regular file, sorted by name.
pub fn build_listing(storage: &Path) -> io::Result<String> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(storage)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        entries.push((name, metadata.len()));
    }
    entries.sort();

    let mut listing = String::new();
    for (name, size) in entries {
        listing.push_str(&format!("{name} - {size} Bytes\n"));
    }
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_pass() {
        assert_eq!(sanitize_filename("report.pdf"), Some("report.pdf".into()));
        assert_eq!(sanitize_filename("a"), Some("a".into()));
    }

    #[test]
    fn traversal_rejected() {
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename("."), None);
        assert_eq!(sanitize_filename(".."), None);
        assert_eq!(sanitize_filename("../etc/passwd"), None);
        assert_eq!(sanitize_filename("/etc/passwd"), None);
        assert_eq!(sanitize_filename("dir/file"), None);
    }

    #[test]
    fn listing_covers_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("beta.bin"), [0u8; 10]).unwrap();
        std::fs::write(dir.path().join("alpha.bin"), [0u8; 4]).unwrap();
        std::fs::create_dir(dir.path().join("subdir")).unwrap();

        let listing = build_listing(dir.path()).unwrap();
        assert_eq!(listing, "alpha.bin - 4 Bytes\nbeta.bin - 10 Bytes\n");
    }

    #[test]
    fn empty_storage_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(build_listing(dir.path()).unwrap(), "");
    }
}
