//! SQLite storage implementations
//!
//! This module provides SQLite-based implementations of all storage traits.
//! SQLite is suitable for single-instance deployments and development.

mod clients;
mod images;
mod tokens;
mod users;

use crate::auth::types::{Client, Token, User};
use crate::errors::StorageError;
use crate::storage::traits::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};

pub use clients::SqliteClientStore;
pub use images::SqliteImageStore;
pub use tokens::SqliteTokenStore;
pub use users::SqliteUserStore;

/// Timestamps are stored as RFC 3339 text
fn parse_timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>> {
    let value: String = row
        .try_get(column)
        .map_err(|e| StorageError::DatabaseError(format!("Failed to get {}: {}", column, e)))?;
    Ok(DateTime::parse_from_rfc3339(&value)
        .map_err(|e| StorageError::InvalidData(format!("Invalid {} timestamp: {}", column, e)))?
        .with_timezone(&Utc))
}

/// Comprehensive SQLite storage implementation
pub struct SqliteStorage {
    pool: SqlitePool,
    user_store: SqliteUserStore,
    client_store: SqliteClientStore,
    token_store: SqliteTokenStore,
    image_store: SqliteImageStore,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            user_store: SqliteUserStore::new(pool.clone()),
            client_store: SqliteClientStore::new(pool.clone()),
            token_store: SqliteTokenStore::new(pool.clone()),
            image_store: SqliteImageStore::new(pool.clone()),
            pool,
        }
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations/sqlite")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::DatabaseError(format!("Migration failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for SqliteStorage {
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
impl ClientStore for SqliteStorage {
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
impl TokenStore for SqliteStorage {
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
impl ImageStore for SqliteStorage {
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

impl Storage for SqliteStorage {}
