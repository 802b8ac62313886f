//! Handles POST /oauth/register-client and the /oauth/client/{id} resource

use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::Response,
};
use minijinja::context;
use serde::Deserialize;

use crate::{
    auth::registration::register_client,
    http::{context::AppState, errors::ApiError, middleware_auth::Authenticated, views},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterClientForm {
    pub name: String,
    pub redirect_uri: String,
}

/// The secret is only ever returned here.
pub async fn register_client_handler(
    State(state): State<AppState>,
    Form(form): Form<RegisterClientForm>,
) -> Result<Response, ApiError> {
    let client = register_client(state.storage.as_ref(), &form.name, &form.redirect_uri).await?;
    let secret = client.secret.clone();
    views::render(
        &state,
        StatusCode::OK,
        "client.xml",
        context! { client, secret },
    )
}

pub async fn get_client_handler(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Response, ApiError> {
    let client = state
        .storage
        .get_client(&client_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Client"))?;
    views::render(&state, StatusCode::OK, "client.xml", context! { client })
}

pub async fn delete_client_handler(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Authenticated(principal): Authenticated,
) -> Result<Response, ApiError> {
    principal.ensure_owner(&client_id)?;

    state.storage.delete_client(&client_id).await?;
    tracing::info!(%client_id, "deleted client and revoked its tokens");

    views::success(&state, StatusCode::OK, "Client successfully deleted.")
}
