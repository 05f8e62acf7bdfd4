//! Content integrity hashing.
//!
//! Integrity hashes are plain SHA-256 digests rendered as lowercase hex, so
//! operators can produce them with standard tooling (`sha256sum`).

use sha2::{Digest, Sha256};

/// Compute the hex SHA-256 digest of the given bytes.
///
/// # Example
/// ```
/// use path402_crypto::content_hash;
///
/// let hash = content_hash(b"abc");
/// assert_eq!(hash, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
/// ```
pub fn content_hash(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Verify that content matches an expected hex digest.
///
/// Comparison ignores surrounding whitespace and hex letter case.
pub fn verify_content(content: &[u8], expected: &str) -> bool {
    content_hash(content).eq_ignore_ascii_case(expected.trim())
}
