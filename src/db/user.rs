//! User model for KURCH.

use std::fmt;
use std::str::FromStr;

/// User role within the university.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Role {
    /// Student (default for new accounts).
    #[default]
    Student = 0,
    /// Faculty member.
    Faculty = 1,
    /// Site administrator.
    Admin = 2,
}

impl Role {
    /// Convert role to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
            Role::Admin => "admin",
        }
    }

    /// Check if this role has at least the required permission level.
    ///
    /// # Examples
    ///
    /// ```
    /// use kurch::db::Role;
    ///
    /// assert!(Role::Admin.can_access(Role::Faculty));
    /// assert!(Role::Student.can_access(Role::Student));
    /// assert!(!Role::Student.can_access(Role::Faculty));
    /// ```
    pub fn can_access(&self, required: Role) -> bool {
        *self >= required
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "faculty" => Ok(Role::Faculty),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// User entity representing a registered account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address (unique, the session identity).
    pub email: String,
    /// Password hash, absent for accounts backed by an external identity provider.
    pub password_hash: Option<String>,
    /// Identity provider ("credentials" for local accounts).
    pub provider: String,
    /// Profile picture URL.
    pub profile_pic: Option<String>,
    /// User role.
    #[sqlx(try_from = "String")]
    pub role: Role,
    /// Whether the email address has been verified.
    pub is_verified: bool,
    /// Account creation timestamp.
    pub created_at: String,
}

impl User {
    /// Check if this account has a local credential.
    pub fn has_local_credential(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Password hash (pre-hashed), or None for external-provider accounts.
    pub password_hash: Option<String>,
    /// Identity provider.
    pub provider: String,
    /// User role.
    pub role: Role,
    /// Whether the email address is already verified.
    pub is_verified: bool,
}

impl NewUser {
    /// Create a new local-credential user.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password_hash: Some(password_hash.into()),
            provider: "credentials".to_string(),
            role: Role::Student,
            is_verified: false,
        }
    }

    /// Create a user authenticated by an external identity provider.
    pub fn external(
        name: impl Into<String>,
        email: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password_hash: None,
            provider: provider.into(),
            role: Role::Student,
            is_verified: true,
        }
    }

    /// Set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Mark the email as verified.
    pub fn verified(mut self) -> Self {
        self.is_verified = true;
        self
    }
}
