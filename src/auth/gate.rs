//! Per-endpoint access policies.

use crate::auth::scopes::Scope;
use crate::auth::types::Principal;
use crate::errors::AuthError;

/// How an endpoint treats bearer tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearerPolicy {
    Forbidden,
    AnyScope,
    Require(Scope),
}

/// Which credential kinds an endpoint admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    pub allow_user_credential: bool,
    pub bearer: BearerPolicy,
    pub allow_client_credential: bool,
}

impl AccessPolicy {
    /// Password users and bearer tokens with the given scope
    pub const fn user_or_bearer(scope: Scope) -> Self {
        Self {
            allow_user_credential: true,
            bearer: BearerPolicy::Require(scope),
            allow_client_credential: false,
        }
    }

    /// Password users only
    pub const fn user_only() -> Self {
        Self {
            allow_user_credential: true,
            bearer: BearerPolicy::Forbidden,
            allow_client_credential: false,
        }
    }

    /// Client credentials only
    pub const fn client_only() -> Self {
        Self {
            allow_user_credential: false,
            bearer: BearerPolicy::Forbidden,
            allow_client_credential: true,
        }
    }

    /// Bearer tokens of any scope only
    pub const fn bearer_only() -> Self {
        Self {
            allow_user_credential: false,
            bearer: BearerPolicy::AnyScope,
            allow_client_credential: false,
        }
    }

    pub const fn with_client_credential(mut self) -> Self {
        self.allow_client_credential = true;
        self
    }

    pub const fn with_bearer(mut self, bearer: BearerPolicy) -> Self {
        self.bearer = bearer;
        self
    }

    pub fn admits_basic(&self) -> bool {
        self.allow_user_credential || self.allow_client_credential
    }

    pub fn admits_bearer(&self) -> bool {
        self.bearer != BearerPolicy::Forbidden
    }

    /// Decide whether a resolved principal may call the endpoint.
    pub fn check(&self, principal: &Principal) -> Result<(), AuthError> {
        match principal {
            Principal::User(_) if !self.allow_user_credential => {
                Err(AuthError::WrongCredentialType)
            }
            Principal::Client(_) if !self.allow_client_credential => {
                Err(AuthError::WrongCredentialType)
            }
            Principal::OAuthSession { .. } => match self.bearer {
                BearerPolicy::Forbidden => Err(AuthError::WrongCredentialType),
                BearerPolicy::AnyScope => Ok(()),
                BearerPolicy::Require(scope) if principal.has_scope(scope) => Ok(()),
                BearerPolicy::Require(_) => Err(AuthError::InsufficientScope),
            },
            _ => Ok(()),
        }
    }
}
