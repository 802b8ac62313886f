//! Main router configuration assembling every endpoint with its access policy.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    handler::Handler,
    middleware,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use super::{
    context::AppState,
    handler_images::{
        delete_image_handler, download_image_handler, get_image_handler, upload_image_handler,
    },
    handler_oauth_authorize::authorize_handler,
    handler_oauth_clients::{delete_client_handler, get_client_handler, register_client_handler},
    handler_tokens::{list_user_tokens_handler, revoke_token_handler, token_info_handler},
    handler_users::{
        delete_user_handler, get_user_handler, list_user_images_handler, list_users_handler,
        register_user_handler,
    },
    middleware_auth::{AccessGate, enforce_access_policy},
    views::render_error_views,
};
use crate::auth::{AccessPolicy, BearerPolicy, Scope};

const READ_DIRECTORY: AccessPolicy =
    AccessPolicy::user_or_bearer(Scope::Read).with_client_credential();
const READ: AccessPolicy = AccessPolicy::user_or_bearer(Scope::Read);
const WRITE: AccessPolicy = AccessPolicy::user_or_bearer(Scope::Write);
const USER_ONLY: AccessPolicy = AccessPolicy::user_only();
const CLIENT_ONLY: AccessPolicy = AccessPolicy::client_only();
const BEARER_ONLY: AccessPolicy = AccessPolicy::bearer_only();
const CLIENT_LOOKUP: AccessPolicy = AccessPolicy::user_only()
    .with_client_credential()
    .with_bearer(BearerPolicy::AnyScope);

/// Build the application router
pub fn build_router(ctx: AppState) -> Router {
    // Wraps a handler in the authentication middleware for `policy`
    macro_rules! gated {
        ($handler:expr, $policy:expr) => {
            $handler.layer(middleware::from_fn_with_state(
                AccessGate::new(ctx.clone(), $policy),
                enforce_access_policy,
            ))
        };
    }

    let user_routes = Router::new()
        .route("/register", post(register_user_handler))
        .route("/users", get(gated!(list_users_handler, READ_DIRECTORY)))
        .route(
            "/user/{id}",
            get(gated!(get_user_handler, READ_DIRECTORY))
                .delete(gated!(delete_user_handler, USER_ONLY)),
        )
        .route(
            "/user/{id}/images",
            get(gated!(list_user_images_handler, READ_DIRECTORY)),
        )
        .route(
            "/user/{id}/tokens",
            get(gated!(list_user_tokens_handler, USER_ONLY)),
        );

    let image_routes = Router::new()
        .route("/upload", post(gated!(upload_image_handler, WRITE)))
        .route(
            "/image/{id}",
            get(gated!(get_image_handler, READ)).delete(gated!(delete_image_handler, WRITE)),
        )
        .route(
            "/image/{id}/download",
            get(gated!(download_image_handler, READ)),
        );

    let oauth_routes = Router::new()
        .route("/register-client", post(register_client_handler))
        .route(
            "/client/{id}",
            get(gated!(get_client_handler, CLIENT_LOOKUP))
                .delete(gated!(delete_client_handler, CLIENT_ONLY)),
        )
        .route("/authorize", get(gated!(authorize_handler, USER_ONLY)))
        .route("/token", get(gated!(token_info_handler, BEARER_ONLY)))
        .route("/token/{value}", delete(gated!(revoke_token_handler, WRITE)));

    let body_limit = *ctx.config.max_upload_size.as_ref();

    Router::new()
        .merge(user_routes)
        .merge(image_routes)
        .nest("/oauth", oauth_routes)
        .layer(middleware::from_fn_with_state(ctx.clone(), render_error_views))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
