//! Storage trait definitions for credentials and image metadata.
//!
//! Defines async storage interfaces for users, OAuth clients, bearer tokens
//! and images that can be implemented by various backend providers. Reads
//! report absence as `Ok(None)`; uniqueness violations on insert surface as
//! [`StorageError::Conflict`].

use crate::auth::types::{Client, Token, User};
use crate::errors::StorageError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Image metadata; the JPEG bytes live in [`crate::storage::files::ImageFiles`]
#[derive(Debug, Clone, Serialize)]
pub struct Image {
    pub id: i64,
    pub title: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

/// Trait for storing and retrieving password users
#[async_trait]
pub trait UserStore {
    /// Retrieve a user by ID
    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    /// Store a new user, failing with `Conflict` when the id is taken
    async fn insert_user(&self, user: &User) -> Result<()>;

    /// Delete a user together with their tokens and image records
    async fn delete_user(&self, user_id: &str) -> Result<()>;

    /// List all users ordered by id
    async fn list_users(&self) -> Result<Vec<User>>;
}

/// Trait for storing and retrieving OAuth clients
#[async_trait]
pub trait ClientStore {
    /// Retrieve a client by ID
    async fn get_client(&self, client_id: &str) -> Result<Option<Client>>;

    /// Store a new client, failing with `Conflict` when the id is taken
    async fn insert_client(&self, client: &Client) -> Result<()>;

    /// Delete a client and revoke every token issued through it
    async fn delete_client(&self, client_id: &str) -> Result<()>;
}

/// Trait for storing and retrieving bearer tokens
#[async_trait]
pub trait TokenStore {
    /// Retrieve a token by its exact value
    async fn get_token(&self, value: &str) -> Result<Option<Token>>;

    /// Store a new token, failing with `Conflict` when the value is taken
    async fn insert_token(&self, token: &Token) -> Result<()>;

    /// Revoke a token
    async fn delete_token(&self, value: &str) -> Result<()>;

    /// Get all tokens for a user
    async fn list_tokens_for_user(&self, user_id: &str) -> Result<Vec<Token>>;
}

/// Trait for storing and retrieving image metadata
#[async_trait]
pub trait ImageStore {
    /// Retrieve an image by ID
    async fn get_image(&self, image_id: i64) -> Result<Option<Image>>;

    /// Store a new image record and return it with its assigned id
    async fn insert_image(&self, title: &str, owner_id: &str) -> Result<Image>;

    /// Delete an image record
    async fn delete_image(&self, image_id: i64) -> Result<()>;

    /// List all images owned by a user ordered by id
    async fn list_images_for_user(&self, owner_id: &str) -> Result<Vec<Image>>;
}

// ===== Combined Storage Trait =====

/// Combined credential and image storage trait
pub trait Storage: UserStore + ClientStore + TokenStore + ImageStore + Send + Sync {}
