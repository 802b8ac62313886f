//! Credential model: users, OAuth clients, bearer tokens, and the resolved
//! principal attached to a request.

use chrono::{DateTime, Utc};
use rand::{Rng, RngCore, distributions::Alphanumeric};
use serde::Serialize;
use std::fmt;

use crate::auth::scopes::{Scope, ScopeSet};
use crate::errors::AuthError;

/// Leading marker of every client id.
///
/// User ids are restricted to `[a-zA-Z0-9_-]`, so the marker alone tells the
/// two Basic-credential namespaces apart.
pub const CLIENT_ID_SENTINEL: char = '$';

/// Number of random bytes in a bearer token value (512 bits).
pub const TOKEN_BYTES: usize = 64;

/// Password-authenticated account
#[derive(Clone, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(skip)]
    pub password_salt: Vec<u8>,
    #[serde(skip)]
    pub password_hash: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Third-party OAuth client
#[derive(Clone, Serialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub redirect_uri: String,
    #[serde(skip)]
    pub secret: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("redirect_uri", &self.redirect_uri)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Bearer token bound to a user, an optional client, and a scope set
#[derive(Debug, Clone, Serialize)]
pub struct Token {
    pub value: String,
    pub user_id: String,
    pub client_id: Option<String>,
    pub scopes: ScopeSet,
    pub created_at: DateTime<Utc>,
}

/// Identity resolved from the Authorization header.
#[derive(Debug, Clone)]
pub enum Principal {
    User(User),
    Client(Client),
    OAuthSession { token: Token, user: User },
}

impl Principal {
    /// Identifier the principal acts as for ownership checks.
    pub fn acting_id(&self) -> &str {
        match self {
            Principal::User(user) => &user.id,
            Principal::Client(client) => &client.id,
            Principal::OAuthSession { user, .. } => &user.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Principal::User(_) => "user",
            Principal::Client(_) => "client",
            Principal::OAuthSession { .. } => "oauth",
        }
    }

    pub fn is_session(&self) -> bool {
        matches!(self, Principal::OAuthSession { .. })
    }

    /// Scopes granted to the principal; `None` for password credentials,
    /// which are not scope-limited.
    pub fn scopes(&self) -> Option<&ScopeSet> {
        match self {
            Principal::OAuthSession { token, .. } => Some(&token.scopes),
            _ => None,
        }
    }

    pub fn has_scope(&self, scope: Scope) -> bool {
        self.scopes().is_none_or(|scopes| scopes.contains(scope))
    }

    /// Ownership gate: the acting identity must equal the resource owner.
    pub fn ensure_owner(&self, owner_id: &str) -> Result<(), AuthError> {
        if self.acting_id() == owner_id {
            Ok(())
        } else {
            Err(AuthError::OwnershipViolation)
        }
    }

    /// Ownership gate applied to reads: password users may read any user's
    /// resources, bearer sessions stay confined to the granting user.
    pub fn ensure_session_owner(&self, owner_id: &str) -> Result<(), AuthError> {
        if self.is_session() {
            self.ensure_owner(owner_id)
        } else {
            Ok(())
        }
    }
}

/// Generate a 512-bit random token value, hex encoded (128 characters)
pub fn generate_token_value() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate a client id carrying the client sentinel
pub fn generate_client_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    format!("{CLIENT_ID_SENTINEL}{suffix}")
}

/// Generate a 256-bit client secret, hex encoded
pub fn generate_client_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
