//! KURCH - Kathmandu University research showcase backend
//!
//! Session-authenticated password management, profiles and project
//! browsing over a SQLite store, served through an axum REST API.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod web;

pub use auth::{
    authenticate, update_credential, Argon2Hasher, CredentialError, CredentialHasher,
    CredentialUpdateRequest, PasswordError, UserDirectory,
};
pub use config::Config;
pub use db::{Database, NewUser, Role, User, UserRepository};
pub use error::{KurchError, Result};
pub use web::WebServer;
