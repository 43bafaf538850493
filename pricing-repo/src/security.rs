//! Admin token hashing.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Hashes a token using SHA-256, hex encoded.
pub fn hash_token(token: &str) -> String {
    let hash = Sha256::digest(token.as_bytes());
    hex::encode(hash)
}

/// Verifies a presented token against a stored hash using constant-time comparison.
pub fn verify_token(input: &str, stored_hash: &str) -> bool {
    let input_hash = hash_token(input);
    input_hash.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic_hex() {
        let hash = hash_token("admin-secret");
        assert_eq!(hash, hash_token("admin-secret"));
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_verify_token() {
        let stored = hash_token("admin-secret");
        assert!(verify_token("admin-secret", &stored));
        assert!(!verify_token("admin-secreT", &stored));
        assert!(!verify_token("", &stored));
    }
}
