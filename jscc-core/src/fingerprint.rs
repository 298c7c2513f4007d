//! Content fingerprints for cache-busting file names.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest.
pub const HASH_LEN: usize = 10;

/// Hash file contents into a short, stable hex string.
pub fn content_hash(contents: &[u8]) -> String {
    let digest = Sha256::digest(contents);
    let mut hash = hex::encode(digest);
    hash.truncate(HASH_LEN);
    hash
}

/// Insert `hash` before the final extension of `path`.
///
/// `dist/app.js` becomes `dist/app-<hash>.js`, `app.js.map` becomes
/// `app.js-<hash>.map` and a name without extension just gains the suffix.
pub fn rev_path(path: &Path, hash: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, hash, ext.to_string_lossy()),
        None => format!("{}-{}", stem, hash),
    };
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable() {
        assert_eq!(content_hash(b"var a=1;"), content_hash(b"var a=1;"));
        assert_eq!(content_hash(b"var a=1;").len(), HASH_LEN);
    }

    #[test]
    fn test_hash_differs_for_different_content() {
        assert_ne!(content_hash(b"var a=1;"), content_hash(b"var a=2;"));
    }

    #[test]
    fn test_hash_known_value() {
        // sha256("") = e3b0c44298fc1c149afbf4c8996fb924...
        assert_eq!(content_hash(b""), "e3b0c44298");
    }

    #[test]
    fn test_rev_path_inserts_before_extension() {
        let path = rev_path(Path::new("/tmp/out/app.js"), "abc123");
        assert_eq!(path, PathBuf::from("/tmp/out/app-abc123.js"));
    }

    #[test]
    fn test_rev_path_source_map() {
        let path = rev_path(Path::new("app.js.map"), "abc123");
        assert_eq!(path, PathBuf::from("app.js-abc123.map"));
    }

    #[test]
    fn test_rev_path_without_extension() {
        let path = rev_path(Path::new("bundle"), "abc123");
        assert_eq!(path, PathBuf::from("bundle-abc123"));
    }
}
