//! PostgreSQL storage implementations
//!
//! This module provides PostgreSQL-based implementations of all storage traits.
//! PostgreSQL is suitable for deployments that share one database between
//! several server instances.

mod clients;
mod images;
mod tokens;
mod users;

use crate::auth::types::{Client, Token, User};
use crate::errors::StorageError;
use crate::storage::traits::*;
use async_trait::async_trait;
use sqlx::postgres::PgPool;

pub use clients::PostgresClientStore;
pub use images::PostgresImageStore;
pub use tokens::PostgresTokenStore;
pub use users::PostgresUserStore;

/// Comprehensive PostgreSQL storage implementation
pub struct PostgresStorage {
    pool: PgPool,
    user_store: PostgresUserStore,
    client_store: PostgresClientStore,
    token_store: PostgresTokenStore,
    image_store: PostgresImageStore,
}

impl PostgresStorage {
    /// Create a new PostgreSQL storage instance
    pub fn new(pool: PgPool) -> Self {
        Self {
            user_store: PostgresUserStore::new(pool.clone()),
            client_store: PostgresClientStore::new(pool.clone()),
            token_store: PostgresTokenStore::new(pool.clone()),
            image_store: PostgresImageStore::new(pool.clone()),
            pool,
        }
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations/postgres")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::DatabaseError(format!("Migration failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PostgresStorage {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        self.user_store.get_user(user_id).await
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        self.user_store.insert_user(user).await
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        self.user_store.delete_user(user_id).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.user_store.list_users().await
    }
}

#[async_trait]
impl ClientStore for PostgresStorage {
    async fn get_client(&self, client_id: &str) -> Result<Option<Client>> {
        self.client_store.get_client(client_id).await
    }

    async fn insert_client(&self, client: &Client) -> Result<()> {
        self.client_store.insert_client(client).await
    }

    async fn delete_client(&self, client_id: &str) -> Result<()> {
        self.client_store.delete_client(client_id).await
    }
}

#[async_trait]
impl TokenStore for PostgresStorage {
    async fn get_token(&self, value: &str) -> Result<Option<Token>> {
        self.token_store.get_token(value).await
    }

    async fn insert_token(&self, token: &Token) -> Result<()> {
        self.token_store.insert_token(token).await
    }

    async fn delete_token(&self, value: &str) -> Result<()> {
        self.token_store.delete_token(value).await
    }

    async fn list_tokens_for_user(&self, user_id: &str) -> Result<Vec<Token>> {
        self.token_store.list_tokens_for_user(user_id).await
    }
}

#[async_trait]
impl ImageStore for PostgresStorage {
    async fn get_image(&self, image_id: i64) -> Result<Option<Image>> {
        self.image_store.get_image(image_id).await
    }

    async fn insert_image(&self, title: &str, owner_id: &str) -> Result<Image> {
        self.image_store.insert_image(title, owner_id).await
    }

    async fn delete_image(&self, image_id: i64) -> Result<()> {
        self.image_store.delete_image(image_id).await
    }

    async fn list_images_for_user(&self, owner_id: &str) -> Result<Vec<Image>> {
        self.image_store.list_images_for_user(owner_id).await
    }
}

impl Storage for PostgresStorage {}
