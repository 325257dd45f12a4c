//! Certificate content hashing.
//!
//! The SHA-256 digest of a certificate file's bytes is its identity on the
//! ledger: the issuance workflow records it, and verifiers look records up
//! by it. One digest, applied consistently, so the hash embedded in a
//! verification link always matches what the ledger was given.

use crate::error::{Result, ResultExt as _};
use sha2::{Digest as _, Sha256};
use std::fs::File;
use std::io::{BufReader, Read as _};
use std::path::Path;

/// Buffer size for streaming file reads (8 KB).
const BUFFER_SIZE: usize = 8192;

/// Hash algorithm identifier surfaced in receipts and logs.
pub const HASH_ALGORITHM: &str = "SHA-256";

/// Compute the SHA-256 digest of in-memory certificate bytes.
///
/// Returns a lowercase hexadecimal string (64 characters). Pure function of
/// the input: identical bytes always produce identical output.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let hash = hasher.finalize();
    format!("{hash:x}")
}

/// Compute the SHA-256 digest of a file using streaming I/O.
///
/// Reads the file in chunks and updates the hash incrementally, so memory
/// use stays constant regardless of file size.
///
/// # Errors
///
/// Returns error if the file doesn't exist, can't be opened, or an I/O
/// error occurs during reading.
pub fn hash_file(path: &Path) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file for hashing: {}", path.display()))?;

    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; BUFFER_SIZE];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        if bytes_read == 0 {
            break; // EOF
        }

        hasher.update(&buffer[..bytes_read]);
    }

    let hash = hasher.finalize();
    Ok(format!("{hash:x}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    #[test]
    fn test_hash_bytes_known_vector() {
        // SHA-256 of "abc"
        assert_eq!(
            hash_bytes(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_bytes_empty() {
        // SHA-256 of the empty string
        assert_eq!(
            hash_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash_bytes_deterministic() {
        let data = b"certificate bytes";
        assert_eq!(hash_bytes(data), hash_bytes(data));
    }

    #[test]
    fn test_single_byte_mutation_changes_hash() {
        let a = hash_bytes(b"certificate bytes");
        let b = hash_bytes(b"certificate bytez");
        assert_ne!(a, b, "Single-byte mutation should change the digest");
    }

    #[test]
    fn test_hash_file_matches_hash_bytes() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"hello world").unwrap();
        temp_file.flush().unwrap();

        let file_hash = hash_file(temp_file.path()).unwrap();
        assert_eq!(file_hash, hash_bytes(b"hello world"));
        assert_eq!(
            file_hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_hash_file_large_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        // Larger than the buffer to exercise the streaming path
        let data = vec![0u8; BUFFER_SIZE * 3 + 100];
        temp_file.write_all(&data).unwrap();
        temp_file.flush().unwrap();

        let hash = hash_file(temp_file.path()).unwrap();
        assert_eq!(hash, hash_bytes(&data));
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_file_nonexistent() {
        let result = hash_file(Path::new("/nonexistent/cert.pdf"));
        assert!(result.is_err());
    }
}
