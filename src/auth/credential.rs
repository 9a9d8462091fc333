//! Credential update and verification workflow.
//!
//! A password change runs as a fixed sequence of guards: session identity,
//! request completeness, reuse check, strength policy, user lookup, stored
//! hash lookup, current password verification. Only after every guard has
//! passed is the new hash computed and written.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

use super::password::{CredentialHasher, PasswordError};
use super::validation::{validate_password_strength, PASSWORD_POLICY};
use crate::db::User;
use crate::KurchError;

/// Failure categories of the credential workflows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// No valid session, or the presented credential is wrong.
    #[error("{0}")]
    Unauthorized(String),

    /// Required fields are missing.
    #[error("{0}")]
    InvalidRequest(String),

    /// The new credential is reused or too weak.
    #[error("{0}")]
    PolicyViolation(String),

    /// Unknown identity or no local credential.
    #[error("{0}")]
    NotFound(String),

    /// Storage or hashing failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<KurchError> for CredentialError {
    fn from(e: KurchError) -> Self {
        CredentialError::Internal(e.to_string())
    }
}

impl From<PasswordError> for CredentialError {
    fn from(e: PasswordError) -> Self {
        CredentialError::Internal(e.to_string())
    }
}

/// Read/write access to user records keyed by identity (email).
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve an identity to its user record.
    async fn lookup_by_identity(&self, identity: &str) -> crate::Result<Option<User>>;

    /// Fetch the stored credential hash for an identity.
    async fn lookup_credential_hash(&self, identity: &str) -> crate::Result<Option<String>>;

    /// Replace the credential hash if it still equals `expected_hash`.
    ///
    /// Returns false when nothing was written.
    async fn update_credential_hash(
        &self,
        identity: &str,
        expected_hash: &str,
        new_hash: &str,
    ) -> crate::Result<bool>;
}

/// A password change request.
///
/// Fields are optional so that absence is reported in order with the
/// other guards rather than at deserialization time.
#[derive(Clone, Default)]
pub struct CredentialUpdateRequest {
    pub current_credential: Option<String>,
    pub new_credential: Option<String>,
}

impl CredentialUpdateRequest {
    /// Create a request with both credentials present.
    pub fn new(current: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            current_credential: Some(current.into()),
            new_credential: Some(new.into()),
        }
    }
}

impl fmt::Debug for CredentialUpdateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("CredentialUpdateRequest")
            .field("current_credential", &redact(&self.current_credential))
            .field("new_credential", &redact(&self.new_credential))
            .finish()
    }
}

/// Run a hashing operation on the blocking pool.
async fn run_hasher<H, T, F>(hasher: &Arc<H>, op: F) -> Result<T, CredentialError>
where
    H: CredentialHasher + ?Sized,
    T: Send + 'static,
    F: FnOnce(&H) -> Result<T, PasswordError> + Send + 'static,
{
    let hasher = Arc::clone(hasher);
    let result = tokio::task::spawn_blocking(move || op(&*hasher))
        .await
        .map_err(|e| CredentialError::Internal(format!("hashing task failed: {e}")))?;
    Ok(result?)
}

/// Replace the stored password of `identity`.
///
/// Guards run in order and the first failure is returned; nothing is
/// written unless all of them pass. The final write is conditional on the
/// stored hash still being the one that was verified, so two concurrent
/// changes cannot both succeed.
pub async fn update_credential<D, H>(
    directory: &D,
    hasher: &Arc<H>,
    identity: Option<&str>,
    request: CredentialUpdateRequest,
) -> Result<(), CredentialError>
where
    D: UserDirectory + ?Sized,
    H: CredentialHasher + ?Sized,
{
    let identity = match identity {
        Some(id) if !id.is_empty() => id,
        _ => {
            return Err(CredentialError::Unauthorized(
                "Authentication required".to_string(),
            ))
        }
    };

    let (current, new) = match (request.current_credential, request.new_credential) {
        (Some(current), Some(new)) if !current.is_empty() && !new.is_empty() => (current, new),
        _ => {
            return Err(CredentialError::InvalidRequest(
                "All fields are required".to_string(),
            ))
        }
    };

    if new == current {
        return Err(CredentialError::PolicyViolation(
            "New password cannot be the same as the current password".to_string(),
        ));
    }

    validate_password_strength(&new)
        .map_err(|_| CredentialError::PolicyViolation(PASSWORD_POLICY.to_string()))?;

    let user = directory
        .lookup_by_identity(identity)
        .await?
        .ok_or_else(|| CredentialError::NotFound("User not found".to_string()))?;

    let stored_hash = directory
        .lookup_credential_hash(&user.email)
        .await?
        .ok_or_else(|| CredentialError::NotFound("User has no password set".to_string()))?;

    let verified = {
        let digest = stored_hash.clone();
        run_hasher(hasher, move |h| h.verify(&current, &digest)).await?
    };
    if !verified {
        warn!(user_id = %user.id, "Password change rejected: current password incorrect");
        return Err(CredentialError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let new_hash = run_hasher(hasher, move |h| h.hash(&new)).await?;

    let written = directory
        .update_credential_hash(&user.email, &stored_hash, &new_hash)
        .await?;
    if !written {
        warn!(user_id = %user.id, "Password change lost to a concurrent update");
        return Err(CredentialError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    info!(user_id = %user.id, "Password changed");
    Ok(())
}

/// Check an email/password pair and return the matching user.
///
/// Unknown users, accounts without a local credential and wrong passwords
/// all produce the same `Unauthorized` error.
pub async fn authenticate<D, H>(
    directory: &D,
    hasher: &Arc<H>,
    email: &str,
    password: &str,
) -> Result<User, CredentialError>
where
    D: UserDirectory + ?Sized,
    H: CredentialHasher + ?Sized,
{
    let rejected = || CredentialError::Unauthorized("Invalid email or password".to_string());

    if email.is_empty() || password.is_empty() {
        return Err(CredentialError::InvalidRequest(
            "Email and password are required".to_string(),
        ));
    }

    let user = directory.lookup_by_identity(email).await?.ok_or_else(rejected)?;
    let Some(stored_hash) = user.password_hash.clone() else {
        return Err(rejected());
    };

    let password = password.to_string();
    let verified = run_hasher(hasher, move |h| h.verify(&password, &stored_hash))
        .await
        .map_err(|e| {
            error!(user_id = %user.id, error = %e, "Stored password hash unusable");
            e
        })?;

    if !verified {
        warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(rejected());
    }

    Ok(user)
}
