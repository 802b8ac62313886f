//! SQLite implementation for OAuth client storage

use crate::auth::types::Client;
use crate::errors::StorageError;
use crate::storage::traits::{ClientStore, Result};
use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};

use super::parse_timestamp;

/// SQLite implementation of OAuth client storage
pub struct SqliteClientStore {
    pool: SqlitePool,
}

impl SqliteClientStore {
    /// Create a new SQLite client store
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_client(row: &SqliteRow) -> Result<Client> {
        Ok(Client {
            id: row
                .try_get("id")
                .map_err(|e| StorageError::DatabaseError(format!("Failed to get id: {}", e)))?,
            name: row
                .try_get("name")
                .map_err(|e| StorageError::DatabaseError(format!("Failed to get name: {}", e)))?,
            redirect_uri: row.try_get("redirect_uri").map_err(|e| {
                StorageError::DatabaseError(format!("Failed to get redirect_uri: {}", e))
            })?,
            secret: row
                .try_get("secret")
                .map_err(|e| StorageError::DatabaseError(format!("Failed to get secret: {}", e)))?,
            created_at: parse_timestamp(row, "created_at")?,
        })
    }
}

#[async_trait]
impl ClientStore for SqliteClientStore {
    async fn get_client(&self, client_id: &str) -> Result<Option<Client>> {
        let row = sqlx::query("SELECT * FROM clients WHERE id = ?")
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(format!("Failed to get client: {}", e)))?;

        row.as_ref().map(Self::row_to_client).transpose()
    }

    async fn insert_client(&self, client: &Client) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO clients (id, name, redirect_uri, secret, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&client.id)
        .bind(&client.name)
        .bind(&client.redirect_uri)
        .bind(&client.secret)
        .bind(client.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_client(&self, client_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM tokens WHERE client_id = ?")
            .bind(client_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM clients WHERE id = ?")
            .bind(client_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
