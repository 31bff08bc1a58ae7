//! Identity service backed by a roster file.
//!
//! Roster layout (shared with the member service):
//!
//! ```json
//! {
//!   "accounts": [
//!     { "user": { "id": "u1", "name": "Ada", "email": "ada@club.test",
//!                 "role": "admin" },
//!       "passwordHash": "$2b$10$..." }
//!   ],
//!   "members": []
//! }
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};

use super::AuthError;
use super::password::verify_password;
use crate::models::User;
use crate::session::{AUTH_TOKEN_KEY, SessionStore, StoreError};

/// Length of issued auth tokens.
const TOKEN_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// A successfully authenticated user and the opaque token issued for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: User,
    pub token: String,
}

#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, AuthError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterAccount {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Default, Deserialize)]
struct RosterAccounts {
    #[serde(default)]
    accounts: Vec<RosterAccount>,
}

/// Authenticates against the `accounts` of a roster file. The file is read on
/// every attempt so edits take effect without a restart.
#[derive(Debug, Clone)]
pub struct RosterIdentityService {
    path: PathBuf,
}

impl RosterIdentityService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn accounts(&self) -> Result<Vec<RosterAccount>, AuthError> {
        let roster_err = |message: String| AuthError::Roster {
            path: self.path.clone(),
            message,
        };
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| roster_err(e.to_string()))?;
        let roster: RosterAccounts =
            serde_json::from_str(&contents).map_err(|e| roster_err(e.to_string()))?;
        Ok(roster.accounts)
    }
}

#[async_trait]
impl IdentityService for RosterIdentityService {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let email = credentials.email.trim();
        let account = self
            .accounts()
            .await?
            .into_iter()
            .find(|a| a.user.email.eq_ignore_ascii_case(email))
            .ok_or(AuthError::CredentialError)?;

        if !verify_password(&credentials.password, &account.password_hash)? {
            log::debug!("password mismatch for {}", account.user.id);
            return Err(AuthError::CredentialError);
        }

        Ok(Identity {
            user: account.user,
            token: generate_token(),
        })
    }
}

/// Random alphanumeric token.
pub fn generate_token() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Persist the identity's token under `authToken`.
pub fn issue_token(identity: &Identity, store: &dyn SessionStore) -> Result<(), StoreError> {
    store.set(AUTH_TOKEN_KEY, &identity.token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::models::{PermissionMap, Role};
    use crate::session::MemoryStore;

    fn write_roster(dir: &Path, password: &str) -> PathBuf {
        let account = RosterAccount {
            user: User {
                id: "u1".to_string(),
                name: "Ada".to_string(),
                email: "Ada@Club.test".to_string(),
                role: Role::Admin,
                permissions: PermissionMap::new(),
            },
            password_hash: hash_password(password).unwrap(),
        };
        let path = dir.join("roster.json");
        std::fs::write(
            &path,
            serde_json::to_string(&serde_json::json!({ "accounts": [account] })).unwrap(),
        )
        .unwrap();
        path
    }

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn authenticates_case_insensitive_email() {
        let dir = tempfile::tempdir().unwrap();
        let service = RosterIdentityService::new(write_roster(dir.path(), "s3cret"));

        let identity = service
            .authenticate(&creds(" ada@club.test ", "s3cret"))
            .await
            .unwrap();
        assert_eq!(identity.user.id, "u1");
        assert_eq!(identity.token.len(), TOKEN_LEN);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_credential_errors() {
        let dir = tempfile::tempdir().unwrap();
        let service = RosterIdentityService::new(write_roster(dir.path(), "s3cret"));

        assert!(matches!(
            service.authenticate(&creds("ada@club.test", "nope")).await,
            Err(AuthError::CredentialError)
        ));
        assert!(matches!(
            service.authenticate(&creds("bob@club.test", "s3cret")).await,
            Err(AuthError::CredentialError)
        ));
    }

    #[tokio::test]
    async fn missing_roster_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let service = RosterIdentityService::new(dir.path().join("missing.json"));
        assert!(matches!(
            service.authenticate(&creds("a@b.c", "x")).await,
            Err(AuthError::Roster { .. })
        ));
    }

    #[test]
    fn issue_token_writes_auth_token_key() {
        let store = MemoryStore::new();
        let identity = Identity {
            user: User {
                id: "u2".to_string(),
                name: "Bo".to_string(),
                email: "bo@club.test".to_string(),
                role: Role::Member,
                permissions: PermissionMap::new(),
            },
            token: generate_token(),
        };
        issue_token(&identity, &store).unwrap();
        assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap(), Some(identity.token));
    }

    #[test]
    fn tokens_are_distinct() {
        assert_ne!(generate_token(), generate_token());
    }
}
