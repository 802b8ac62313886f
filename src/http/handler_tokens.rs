//! Handles the bearer token resources under /oauth/token and /user/{id}/tokens

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use minijinja::context;

use crate::{
    auth::{Principal, revoke_token},
    errors::AuthError,
    http::{context::AppState, errors::ApiError, middleware_auth::Authenticated, views},
};

/// Describe the token the request was made with
pub async fn token_info_handler(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> Result<Response, ApiError> {
    let Principal::OAuthSession { token, .. } = principal else {
        return Err(AuthError::WrongCredentialType.into());
    };
    views::render(&state, StatusCode::OK, "token.xml", context! { token })
}

pub async fn list_user_tokens_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Authenticated(principal): Authenticated,
) -> Result<Response, ApiError> {
    principal.ensure_owner(&user_id)?;

    let tokens = state.storage.list_tokens_for_user(&user_id).await?;
    views::render(
        &state,
        StatusCode::OK,
        "tokens.xml",
        context! { user_id, tokens },
    )
}

pub async fn revoke_token_handler(
    State(state): State<AppState>,
    Path(value): Path<String>,
    Authenticated(principal): Authenticated,
) -> Result<Response, ApiError> {
    let token = state
        .storage
        .get_token(&value)
        .await?
        .ok_or_else(|| ApiError::not_found("Token"))?;
    principal.ensure_owner(&token.user_id)?;

    revoke_token(state.storage.as_ref(), &token.value).await?;
    tracing::info!(user_id = %token.user_id, client_id = ?token.client_id, "revoked token");

    views::success(&state, StatusCode::OK, "Token successfully revoked.")
}
