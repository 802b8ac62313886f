//! PostgreSQL implementation for OAuth client storage

use crate::auth::types::Client;
use crate::errors::StorageError;
use crate::storage::traits::{ClientStore, Result};
use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgRow};

/// PostgreSQL implementation of OAuth client storage
pub struct PostgresClientStore {
    pool: PgPool,
}

impl PostgresClientStore {
    /// Create a new PostgreSQL client store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_client(row: &PgRow) -> Result<Client> {
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
            created_at: row.try_get("created_at").map_err(|e| {
                StorageError::DatabaseError(format!("Failed to get created_at: {}", e))
            })?,
        })
    }
}

#[async_trait]
impl ClientStore for PostgresClientStore {
    async fn get_client(&self, client_id: &str) -> Result<Option<Client>> {
        let row = sqlx::query("SELECT * FROM clients WHERE id = $1")
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
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&client.id)
        .bind(&client.name)
        .bind(&client.redirect_uri)
        .bind(&client.secret)
        .bind(client.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_client(&self, client_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM tokens WHERE client_id = $1")
            .bind(client_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(client_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
