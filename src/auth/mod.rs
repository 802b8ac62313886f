//! Authentication and authorization: credential model, scope handling,
//! token issuance, credential resolution and per-endpoint access policies.

pub mod authenticator;
pub mod gate;
pub mod issuer;
pub mod passwords;
pub mod registration;
pub mod scopes;
pub mod types;

pub use authenticator::{Authenticator, Credentials};
pub use gate::{AccessPolicy, BearerPolicy};
pub use issuer::{issue_token, revoke_token};
pub use registration::{register_client, register_user};
pub use scopes::{Scope, ScopeSet};
pub use types::{Client, Principal, Token, User};
