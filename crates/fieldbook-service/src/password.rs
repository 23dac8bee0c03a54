//! Salted password hashing.
//!
//! Encoded form is `{salt_hex}${digest_hex}` where the digest is SHA-256
//! over the password bytes followed by the hex-encoded salt. The salt is
//! 16 random bytes per call, so hashing the same password twice yields
//! different encodings.

use rand::RngCore;
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    let salt_hex = hex::encode(salt);
    let digest = digest_hex(password, &salt_hex);
    format!("{salt_hex}${digest}")
}

/// Verify a candidate password against a stored encoding. A malformed
/// stored value (wrong number of `$`-separated parts) is a verification
/// failure, not an error.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.split('$');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(salt_hex), Some(stored_digest), None) if !salt_hex.is_empty() => {
            digest_hex(password, salt_hex) == stored_digest
        }
        _ => false,
    }
}

fn digest_hex(password: &str, salt_hex: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt_hex.as_bytes());
    hex::encode(hasher.finalize())
}
