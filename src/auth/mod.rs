//! Authentication module for KURCH.
//!
//! This module provides password hashing, the credential strength policy,
//! and the password change and login workflows.

mod credential;
mod password;
pub mod validation;

pub use credential::{
    authenticate, update_credential, CredentialError, CredentialUpdateRequest, UserDirectory,
};
pub use password::{
    Argon2Hasher, CredentialHasher, PasswordError, ARGON2_ITERATIONS, ARGON2_MEMORY_KIB,
    ARGON2_PARALLELISM,
};
pub use validation::{ValidationError, PASSWORD_POLICY};
