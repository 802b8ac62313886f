//! Credential authentication middleware.
//!
//! Each protected route is wrapped in [`enforce_access_policy`] with its
//! [`AccessPolicy`]. The middleware resolves the `Authorization` header,
//! applies the policy, and hands the resolved [`Principal`] to the handler
//! through the [`Authenticated`] extractor.

use axum::extract::{FromRequestParts, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use http::request::Parts;
use http::{HeaderMap, HeaderValue, StatusCode};

use crate::auth::{AccessPolicy, Principal};
use crate::errors::AuthError;
use crate::http::context::AppState;
use crate::http::errors::ApiError;

/// Middleware state: the application plus the route's policy
#[derive(Clone)]
pub struct AccessGate {
    state: AppState,
    policy: AccessPolicy,
}

impl AccessGate {
    pub fn new(state: AppState, policy: AccessPolicy) -> Self {
        Self { state, policy }
    }

    async fn authorize(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        let header = headers
            .get(AUTHORIZATION)
            .map(|value| value.to_str().map_err(|_| AuthError::MalformedHeader))
            .transpose()?;

        let principal = self.state.authenticator.authenticate(header).await?;
        self.policy.check(&principal)?;
        Ok(principal)
    }

    /// `WWW-Authenticate` challenges for the credential kinds the policy admits
    fn challenges(&self) -> Vec<String> {
        let realm = self.state.config.auth_realm.as_ref();
        let mut challenges = Vec::new();
        if self.policy.admits_basic() {
            challenges.push(format!("Basic realm=\"{}\", charset=\"UTF-8\"", realm));
        }
        if self.policy.admits_bearer() {
            challenges.push(format!("Bearer realm=\"{}\"", realm));
        }
        challenges
    }
}

/// Authenticate the request and enforce the route's access policy
pub async fn enforce_access_policy(
    State(gate): State<AccessGate>,
    mut request: Request,
    next: Next,
) -> Response {
    match gate.authorize(request.headers()).await {
        Ok(principal) => {
            tracing::debug!(
                kind = principal.kind(),
                acting_id = principal.acting_id(),
                "authenticated"
            );
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(err) => {
            if !matches!(err, AuthError::Storage(_)) {
                tracing::warn!(
                    code = err.code(),
                    method = %request.method(),
                    uri = %request.uri(),
                    "request denied: {}",
                    err
                );
            }

            let status = err.status();
            let mut response = ApiError::from(err).into_response();
            if status == StatusCode::UNAUTHORIZED {
                for challenge in gate.challenges() {
                    if let Ok(value) = HeaderValue::from_str(&challenge) {
                        response.headers_mut().append(WWW_AUTHENTICATE, value);
                    }
                }
            }
            response
        }
    }
}

/// Principal resolved by [`enforce_access_policy`]
#[derive(Clone, Debug)]
pub struct Authenticated(pub Principal);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Authenticated)
            .ok_or(ApiError::Auth(AuthError::MissingCredentials))
    }
}
