//! Salted password hashing.

use rand::RngCore;
use sha2::{Digest, Sha512};

/// Length of a freshly generated password salt in bytes.
pub const SALT_BYTES: usize = 32;

/// Generate a random password salt
pub fn generate_salt() -> Vec<u8> {
    let mut salt = vec![0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// SHA-512 over `salt || password`
pub fn hash_password(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha512::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

/// Check a password against a stored salt and hash
pub fn verify_password(salt: &[u8], expected_hash: &[u8], password: &str) -> bool {
    constant_time_eq(&hash_password(salt, password), expected_hash)
}

/// Compare two byte strings without short-circuiting on the first mismatch.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_depends_on_salt() {
        let first = generate_salt();
        let second = generate_salt();
        assert_eq!(first.len(), SALT_BYTES);
        assert_ne!(first, second);

        assert_eq!(hash_password(&first, "pw").len(), 64);
        assert_ne!(hash_password(&first, "pw"), hash_password(&second, "pw"));
        assert_eq!(hash_password(&first, "pw"), hash_password(&first, "pw"));
    }

    #[test]
    fn test_verify_password() {
        let salt = generate_salt();
        let hash = hash_password(&salt, "correct horse:battery");

        assert!(verify_password(&salt, &hash, "correct horse:battery"));
        assert!(!verify_password(&salt, &hash, "correct horse"));
        assert!(!verify_password(&salt, &hash, ""));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(constant_time_eq(b"", b""));
    }
}
