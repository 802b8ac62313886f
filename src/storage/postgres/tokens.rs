//! PostgreSQL implementation for bearer token storage

use crate::auth::scopes::ScopeSet;
use crate::auth::types::Token;
use crate::errors::StorageError;
use crate::storage::traits::{Result, TokenStore};
use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgRow};

/// PostgreSQL implementation of bearer token storage
pub struct PostgresTokenStore {
    pool: PgPool,
}

impl PostgresTokenStore {
    /// Create a new PostgreSQL token store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_token(row: &PgRow) -> Result<Token> {
        let scopes: String = row
            .try_get("scopes")
            .map_err(|e| StorageError::DatabaseError(format!("Failed to get scopes: {}", e)))?;
        let scopes = ScopeSet::normalize(&scopes)
            .map_err(|_| StorageError::InvalidData(format!("Invalid stored scopes: {}", scopes)))?;

        Ok(Token {
            value: row
                .try_get("value")
                .map_err(|e| StorageError::DatabaseError(format!("Failed to get value: {}", e)))?,
            user_id: row.try_get("user_id").map_err(|e| {
                StorageError::DatabaseError(format!("Failed to get user_id: {}", e))
            })?,
            client_id: row.try_get("client_id").map_err(|e| {
                StorageError::DatabaseError(format!("Failed to get client_id: {}", e))
            })?,
            scopes,
            created_at: row.try_get("created_at").map_err(|e| {
                StorageError::DatabaseError(format!("Failed to get created_at: {}", e))
            })?,
        })
    }
}

#[async_trait]
impl TokenStore for PostgresTokenStore {
    async fn get_token(&self, value: &str) -> Result<Option<Token>> {
        let row = sqlx::query("SELECT * FROM tokens WHERE value = $1")
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(format!("Failed to get token: {}", e)))?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn insert_token(&self, token: &Token) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tokens (value, user_id, client_id, scopes, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&token.value)
        .bind(&token.user_id)
        .bind(&token.client_id)
        .bind(token.scopes.to_string())
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_token(&self, value: &str) -> Result<()> {
        sqlx::query("DELETE FROM tokens WHERE value = $1")
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(format!("Failed to delete token: {}", e)))?;

        Ok(())
    }

    async fn list_tokens_for_user(&self, user_id: &str) -> Result<Vec<Token>> {
        let rows =
            sqlx::query("SELECT * FROM tokens WHERE user_id = $1 ORDER BY created_at DESC")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StorageError::QueryFailed(format!("Failed to list tokens: {}", e)))?;

        rows.iter().map(Self::row_to_token).collect()
    }
}
