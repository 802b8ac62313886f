//! Credential parsing and resolution.
//!
//! An `Authorization` header is first parsed into [`Credentials`] without
//! touching storage, then resolved against the credential store into a
//! [`Principal`]. The `$` client-id marker is interpreted here and nowhere
//! else.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::sync::Arc;

use crate::auth::passwords::{constant_time_eq, verify_password};
use crate::auth::types::{CLIENT_ID_SENTINEL, Principal};
use crate::errors::AuthError;
use crate::storage::traits::Storage;

/// Credentials carried by a request, before any store lookup.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    User { id: String, password: String },
    Client { id: String, secret: String },
    Bearer(String),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::User { id, .. } => f.debug_struct("User").field("id", id).finish(),
            Credentials::Client { id, .. } => f.debug_struct("Client").field("id", id).finish(),
            Credentials::Bearer(_) => f.write_str("Bearer"),
        }
    }
}

impl Credentials {
    /// Parse the raw value of an `Authorization` header.
    pub fn parse(header: Option<&str>) -> Result<Self, AuthError> {
        let header = header.map(str::trim).unwrap_or_default();
        if header.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        // A known scheme with nothing after it is a credential failure, not a
        // malformed header.
        let (scheme, payload) = header.split_once(' ').unwrap_or((header, ""));
        let payload = payload.trim();

        match scheme.to_ascii_lowercase().as_str() {
            "basic" => Self::parse_basic(payload),
            "bearer" if payload.is_empty() => Err(AuthError::InvalidToken),
            "bearer" => Ok(Credentials::Bearer(payload.to_string())),
            _ if payload.is_empty() => Err(AuthError::MalformedHeader),
            other => Err(AuthError::UnsupportedScheme(other.to_string())),
        }
    }

    fn parse_basic(payload: &str) -> Result<Self, AuthError> {
        let decoded = STANDARD
            .decode(payload)
            .map_err(|_| AuthError::MalformedCredentials)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedCredentials)?;

        // Passwords may contain colons, ids may not.
        let (id, password) = decoded
            .split_once(':')
            .ok_or(AuthError::MalformedCredentials)?;

        if id.starts_with(CLIENT_ID_SENTINEL) {
            Ok(Credentials::Client {
                id: id.to_string(),
                secret: password.to_string(),
            })
        } else {
            Ok(Credentials::User {
                id: id.to_string(),
                password: password.to_string(),
            })
        }
    }
}

/// Resolves request credentials to a [`Principal`].
#[derive(Clone)]
pub struct Authenticator {
    storage: Arc<dyn Storage>,
}

impl Authenticator {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Parse and resolve an `Authorization` header value
    pub async fn authenticate(&self, header: Option<&str>) -> Result<Principal, AuthError> {
        let credentials = Credentials::parse(header)?;
        self.resolve(credentials).await
    }

    /// Look parsed credentials up in the credential store
    pub async fn resolve(&self, credentials: Credentials) -> Result<Principal, AuthError> {
        match credentials {
            Credentials::User { id, password } => {
                let user = self
                    .storage
                    .get_user(&id)
                    .await?
                    .ok_or(AuthError::InvalidCredentials)?;

                if !verify_password(&user.password_salt, &user.password_hash, &password) {
                    tracing::debug!(user_id = %id, "password mismatch");
                    return Err(AuthError::InvalidCredentials);
                }

                Ok(Principal::User(user))
            }
            Credentials::Client { id, secret } => {
                let client = self
                    .storage
                    .get_client(&id)
                    .await?
                    .ok_or(AuthError::InvalidCredentials)?;

                if !constant_time_eq(client.secret.as_bytes(), secret.as_bytes()) {
                    tracing::debug!(client_id = %id, "client secret mismatch");
                    return Err(AuthError::InvalidCredentials);
                }

                Ok(Principal::Client(client))
            }
            Credentials::Bearer(value) => {
                let token = self
                    .storage
                    .get_token(&value)
                    .await?
                    .ok_or(AuthError::InvalidToken)?;

                let user = self
                    .storage
                    .get_user(&token.user_id)
                    .await?
                    .ok_or(AuthError::InvalidToken)?;

                Ok(Principal::OAuthSession { token, user })
            }
        }
    }
}
