//! User repository for KURCH.
//!
//! This module provides user lookups and credential updates against the
//! users table.

use async_trait::async_trait;

use super::user::{NewUser, User};
use super::DbPool;
use crate::auth::UserDirectory;
use crate::{KurchError, Result};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, provider, profile_pic, role, is_verified, created_at";

/// Repository for user operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// Returns the created user with its generated ID.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, provider, role, is_verified)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.provider)
        .bind(new_user.role.as_str())
        .bind(new_user.is_verified)
        .execute(self.pool)
        .await
        .map_err(|e| KurchError::Database(e.to_string()))?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| KurchError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let result = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| KurchError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get a user by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE");
        let result = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| KurchError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get the stored password hash for an email.
    ///
    /// Returns None both for unknown emails and for accounts without a
    /// local credential.
    pub async fn get_password_hash(&self, email: &str) -> Result<Option<String>> {
        let hash: Option<Option<String>> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE email = ? COLLATE NOCASE")
                .bind(email)
                .fetch_optional(self.pool)
                .await
                .map_err(|e| KurchError::Database(e.to_string()))?;

        Ok(hash.flatten())
    }

    /// Replace the password hash for an email, only if the stored hash is
    /// still `expected_hash`.
    ///
    /// Returns false when no row matched, i.e. the user is gone or the
    /// hash was changed concurrently.
    pub async fn update_password_hash(
        &self,
        email: &str,
        expected_hash: &str,
        new_hash: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = ?
             WHERE email = ? COLLATE NOCASE AND password_hash = ?",
        )
        .bind(new_hash)
        .bind(email)
        .bind(expected_hash)
        .execute(self.pool)
        .await
        .map_err(|e| KurchError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserDirectory for UserRepository<'_> {
    async fn lookup_by_identity(&self, identity: &str) -> Result<Option<User>> {
        self.get_by_email(identity).await
    }

    async fn lookup_credential_hash(&self, identity: &str) -> Result<Option<String>> {
        self.get_password_hash(identity).await
    }

    async fn update_credential_hash(
        &self,
        identity: &str,
        expected_hash: &str,
        new_hash: &str,
    ) -> Result<bool> {
        self.update_password_hash(identity, expected_hash, new_hash)
            .await
    }
}
