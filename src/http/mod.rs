//! Axum HTTP server: XML views, access-gated handlers and the router.

pub mod context;
pub mod errors;
mod handler_images;
mod handler_oauth_authorize;
mod handler_oauth_clients;
mod handler_tokens;
mod handler_users;
pub mod middleware_auth;
pub mod server;
pub mod views;

pub use context::AppState;
pub use server::build_router;
