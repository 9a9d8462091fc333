//! API handlers.

pub mod auth;
pub mod profile;
pub mod project;

pub use auth::*;
pub use profile::*;
pub use project::*;
