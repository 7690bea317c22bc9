//! Content hashing for copy verification

use blake3;

/// Compute BLAKE3 hash of content, hex-encoded
///
/// Used by folder relocation to confirm a copied file matches its source
/// before the source is deleted.
pub fn compute_hash(content: &[u8]) -> String {
    let hash = blake3::hash(content);
    hash.to_hex().to_string()
}
