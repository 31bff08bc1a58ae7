//! Authentication: the identity service that turns credentials into a user.
//!
//! The session manager only consumes the [`Identity`] produced here; it never
//! sees credentials.

pub mod identity;
pub mod password;

use std::path::PathBuf;

use thiserror::Error;

pub use identity::{
    Credentials, Identity, IdentityService, RosterAccount, RosterIdentityService, generate_token,
    issue_token,
};

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    #[error("Roster {path} unavailable: {message}")]
    Roster { path: PathBuf, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}
