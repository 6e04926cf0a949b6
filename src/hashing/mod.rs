//! Content digests used to derive stable synthetic names.

use sha2::{Digest, Sha256};

/// Computes the SHA-256 digest of the given data and returns it as a hex string.
pub fn sha256_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Hex of the first `len` bytes of the SHA-256 digest (capped at 32).
pub fn short_digest(data: &[u8], len: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    hex::encode(&digest[..len.min(digest.len())])
}
