//! Handles POST /register and the /users, /user/{id} resources

use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::Response,
};
use minijinja::context;
use serde::Deserialize;

use crate::{
    auth::registration::register_user,
    http::{context::AppState, errors::ApiError, middleware_auth::Authenticated, views},
};

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub id: String,
    pub name: String,
    pub password: String,
}

pub async fn register_user_handler(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, ApiError> {
    let user = register_user(state.storage.as_ref(), &form.id, &form.name, &form.password).await?;
    views::render(
        &state,
        StatusCode::OK,
        "user.xml",
        context! { user },
    )
}

pub async fn list_users_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let users = state.storage.list_users().await?;
    views::render(&state, StatusCode::OK, "users.xml", context! { users })
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let user = state
        .storage
        .get_user(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    views::render(&state, StatusCode::OK, "user.xml", context! { user })
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Authenticated(principal): Authenticated,
) -> Result<Response, ApiError> {
    principal.ensure_owner(&user_id)?;

    state.storage.delete_user(&user_id).await?;
    state.image_files.delete_owner(&user_id).await?;
    tracing::info!(%user_id, "deleted user");

    views::success(&state, StatusCode::OK, "User successfully deleted.")
}

pub async fn list_user_images_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Authenticated(principal): Authenticated,
) -> Result<Response, ApiError> {
    principal.ensure_session_owner(&user_id)?;

    if state.storage.get_user(&user_id).await?.is_none() {
        return Err(ApiError::not_found("User"));
    }

    let images = state.storage.list_images_for_user(&user_id).await?;
    views::render(
        &state,
        StatusCode::OK,
        "images.xml",
        context! { owner_id => user_id, images },
    )
}
