use sha2::{Digest, Sha256};

/// Hex SHA-256 of `bytes`, used to notice that a file changed between read and write.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
