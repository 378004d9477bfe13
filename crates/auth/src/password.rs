//! One-way password hashing.
//!
//! Digests are PHC strings with a per-call random salt embedded, so equal
//! passwords never produce equal digests. Verification recomputes and compares
//! inside the argon2 crate (constant time over the hash output).

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// One-way hash + verify contract for plaintext passwords.
///
/// Implementations must never log or otherwise retain the plaintext.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing digest string.
    fn hash(&self, plaintext: &str) -> Result<String, PasswordHashError>;

    /// Verify a plaintext password against a stored digest.
    ///
    /// Fails closed: a malformed or truncated digest yields `false`, never an
    /// error into caller logic.
    fn verify(&self, plaintext: &str, digest: &str) -> bool;
}

/// Argon2id hasher with default parameters and a fresh random salt per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordHashError> {
        use argon2::password_hash::PasswordHasher as _;

        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|e| PasswordHashError::Hash(e.to_string()))
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hasher = Argon2PasswordHasher::new();
        let digest = hasher.hash("correct horse battery staple").unwrap();

        assert!(hasher.verify("correct horse battery staple", &digest));
        assert!(!hasher.verify("wrong password", &digest));
    }

    #[test]
    fn per_call_salt_makes_digests_distinct() {
        let hasher = Argon2PasswordHasher::new();
        let a = hasher.hash("same password").unwrap();
        let b = hasher.hash("same password").unwrap();

        assert_ne!(a, b);
        assert!(hasher.verify("same password", &a));
        assert!(hasher.verify("same password", &b));
    }

    #[test]
    fn malformed_digest_fails_closed() {
        let hasher = Argon2PasswordHasher::new();

        assert!(!hasher.verify("anything", ""));
        assert!(!hasher.verify("anything", "not-a-phc-string"));
        assert!(!hasher.verify("anything", "$argon2id$v=19$truncated"));
    }
}
