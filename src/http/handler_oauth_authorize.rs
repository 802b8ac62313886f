//! Handles GET /oauth/authorize, the implicit grant.
//!
//! The resource owner authenticates with their password, names the client and
//! the scopes it should receive, and is redirected back to the client's
//! registered URI with the freshly issued token.

use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::Response,
};
use serde::Deserialize;
use url::Url;

use crate::{
    auth::issue_token,
    errors::RegistrationError,
    http::{context::AppState, errors::ApiError, middleware_auth::Authenticated, views},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthorizeQuery {
    pub response_type: String,
    pub client_id: String,
    pub scopes: String,
    pub redirect_uri: String,
    pub state: Option<String>,
}

fn required(value: &str, name: &'static str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::missing_parameter(name))
    } else {
        Ok(())
    }
}

/// Append the grant parameters to the query of `redirect_uri`.
///
/// Any fragment on the registered URI is dropped so clients always find the
/// token in the query string.
fn grant_location(redirect_uri: &str, params: &[(&str, &str)]) -> Result<String, ApiError> {
    let mut location = Url::parse(redirect_uri)
        .map_err(|err| RegistrationError::InvalidRedirectUri(err.to_string()))?;

    location.set_fragment(None);
    location.query_pairs_mut().extend_pairs(params);

    Ok(location.into())
}

pub async fn authorize_handler(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Query(query): Query<AuthorizeQuery>,
) -> Result<Response, ApiError> {
    required(&query.response_type, "response_type")?;
    required(&query.client_id, "client_id")?;
    required(&query.scopes, "scopes")?;
    required(&query.redirect_uri, "redirect_uri")?;

    if query.response_type != "token" {
        return Err(ApiError::BadRequest("Unsupported response type.".to_string()));
    }

    let client = state
        .storage
        .get_client(&query.client_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Client"))?;

    if client.redirect_uri != query.redirect_uri {
        return Err(ApiError::BadRequest(
            "Redirect URI does not match the registered URI.".to_string(),
        ));
    }

    let user_id = principal.acting_id();
    let token = issue_token(
        state.storage.as_ref(),
        user_id,
        Some(&client.id),
        &query.scopes,
    )
    .await?;
    tracing::info!(%user_id, client_id = %client.id, scopes = %token.scopes, "authorization granted");

    let scopes = token.scopes.to_string();
    let mut params = vec![("token", token.value.as_str()), ("scopes", scopes.as_str())];
    if let Some(value) = query.state.as_deref() {
        params.push(("state", value));
    }
    let location = grant_location(&client.redirect_uri, &params)?;

    let mut response = views::success(&state, StatusCode::SEE_OTHER, "Authorization granted.")?;
    let location = header::HeaderValue::from_str(&location)
        .map_err(|_| RegistrationError::InvalidRedirectUri(location.clone()))?;
    response.headers_mut().insert(header::LOCATION, location);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_mode_keeps_existing_parameters() {
        let location = grant_location(
            "https://app.example.com/cb?x=1",
            &[("token", "abc"), ("scopes", "read write"), ("state", "s t")],
        )
        .unwrap();
        assert_eq!(
            location,
            "https://app.example.com/cb?x=1&token=abc&scopes=read+write&state=s+t"
        );
    }

    #[test]
    fn test_grant_never_lands_in_fragment() {
        let location = grant_location(
            "https://app.example.com/cb#section",
            &[("token", "abc"), ("scopes", "read")],
        )
        .unwrap();
        assert_eq!(location, "https://app.example.com/cb?token=abc&scopes=read");
    }
}
