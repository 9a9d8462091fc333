//! Password hashing and verification for KURCH.
//!
//! Uses Argon2id for secure password hashing.

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand_core::OsRng;
use thiserror::Error;

/// Argon2 memory cost in KiB (64 MB).
pub const ARGON2_MEMORY_KIB: u32 = 65536;

/// Argon2 time cost (iterations).
pub const ARGON2_ITERATIONS: u32 = 3;

/// Argon2 parallelism (lanes).
pub const ARGON2_PARALLELISM: u32 = 4;

/// Password hashing errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),

    /// Stored password hash is not a valid PHC string.
    #[error("invalid password hash format")]
    InvalidHash,

    /// Argon2 parameters were rejected.
    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),
}

/// One-way credential hash function.
///
/// Implementations are CPU-bound and are called from the blocking pool.
pub trait CredentialHasher: Send + Sync + 'static {
    /// Hash a plaintext credential into a self-describing digest.
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError>;

    /// Check a plaintext credential against a stored digest.
    ///
    /// Returns `Ok(false)` on mismatch and an error only when the digest
    /// itself is unusable.
    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, PasswordError>;
}

/// Argon2id credential hasher with a fixed work factor.
///
/// # Examples
///
/// ```
/// use kurch::auth::{Argon2Hasher, CredentialHasher};
///
/// let hasher = Argon2Hasher::with_cost(8, 1, 1).unwrap();
/// let hash = hasher.hash("Secret123!").unwrap();
/// assert!(hasher.verify("Secret123!", &hash).unwrap());
/// assert!(!hasher.verify("secret123!", &hash).unwrap());
/// ```
#[derive(Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    /// Create a hasher with the production parameters.
    ///
    /// Parameters:
    /// - Memory cost: 64 MB (65536 KiB)
    /// - Time cost: 3 iterations
    /// - Parallelism: 4 lanes
    pub fn new() -> Self {
        let params = Params::new(
            ARGON2_MEMORY_KIB,
            ARGON2_ITERATIONS,
            ARGON2_PARALLELISM,
            None,
        )
        .expect("valid Argon2 params");
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Create a hasher with custom costs.
    ///
    /// Intended for tests, where the production memory cost is too slow.
    pub fn with_cost(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, PasswordError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;

        Ok(hash.to_string())
    }

    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(digest).map_err(|_| PasswordError::InvalidHash)?;

        // Parameters come from the parsed hash, not from self.argon2
        match Argon2::default().verify_password(plaintext.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::HashError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> Argon2Hasher {
        Argon2Hasher::with_cost(8, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_is_phc_argon2id() {
        let hash = fast_hasher().hash("Passw0rd!").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("$v=19$"));
    }

    #[test]
    fn test_hash_uses_random_salt() {
        let hasher = fast_hasher();
        let hash1 = hasher.hash("Passw0rd!").unwrap();
        let hash2 = hasher.hash("Passw0rd!").unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_correct_and_wrong() {
        let hasher = fast_hasher();
        let hash = hasher.hash("Passw0rd!").unwrap();

        assert!(hasher.verify("Passw0rd!", &hash).unwrap());
        assert!(!hasher.verify("passw0rd!", &hash).unwrap());
        assert!(!hasher.verify("", &hash).unwrap());
    }

    #[test]
    fn test_verify_invalid_hash() {
        let result = fast_hasher().verify("anything", "not_a_valid_hash");
        assert!(matches!(result, Err(PasswordError::InvalidHash)));
    }

    #[test]
    fn test_verify_reads_params_from_hash() {
        // A hash made with light params verifies through the production hasher
        let hash = fast_hasher().hash("Passw0rd!").unwrap();
        assert!(Argon2Hasher::new().verify("Passw0rd!", &hash).unwrap());
    }

    #[test]
    fn test_unicode_and_symbols() {
        let hasher = fast_hasher();
        for password in ["पासवर्ड123Aa!", "p@$$w0rD!#$%^&*()"] {
            let hash = hasher.hash(password).unwrap();
            assert!(hasher.verify(password, &hash).unwrap());
        }
    }

    #[test]
    fn test_with_cost_rejects_bad_params() {
        let result = Argon2Hasher::with_cost(1, 1, 1);
        assert!(matches!(result, Err(PasswordError::InvalidParams(_))));
    }

    #[test]
    fn test_production_params() {
        let hash = Argon2Hasher::new().hash("Passw0rd!").unwrap();
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }
}
