use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

/// Hex encoded SHA-256 of `data`
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Hex encoded SHA-256 of the contents of the file at `path`
///
/// # Errors
/// If the file cannot be read
pub fn sha256_digest(path: &Path) -> Result<String> {
    let data = fs::read(path).with_context(|| format!("Unable to read {}", path.display()))?;
    Ok(sha256_hex(&data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn known_digests() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn file_digest_equals_content_digest() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), b"abc").unwrap();
        assert_eq!(sha256_digest(file.path()).unwrap(), sha256_hex(b"abc"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = sha256_digest(Path::new("/surely/not/here.bin")).unwrap_err();
        assert!(err.to_string().contains("/surely/not/here.bin"));
    }
}
