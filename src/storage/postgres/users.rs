//! PostgreSQL implementation for user storage

use crate::auth::types::User;
use crate::errors::StorageError;
use crate::storage::traits::{Result, UserStore};
use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgRow};

/// PostgreSQL implementation of user storage
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    /// Create a new PostgreSQL user store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Convert PostgreSQL row to User
    fn row_to_user(row: &PgRow) -> Result<User> {
        Ok(User {
            id: row
                .try_get("id")
                .map_err(|e| StorageError::DatabaseError(format!("Failed to get id: {}", e)))?,
            name: row
                .try_get("name")
                .map_err(|e| StorageError::DatabaseError(format!("Failed to get name: {}", e)))?,
            password_salt: row.try_get("password_salt").map_err(|e| {
                StorageError::DatabaseError(format!("Failed to get password_salt: {}", e))
            })?,
            password_hash: row.try_get("password_hash").map_err(|e| {
                StorageError::DatabaseError(format!("Failed to get password_hash: {}", e))
            })?,
            created_at: row.try_get("created_at").map_err(|e| {
                StorageError::DatabaseError(format!("Failed to get created_at: {}", e))
            })?,
        })
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, password_salt, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.password_salt)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM images WHERE owner_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(format!("Failed to list users: {}", e)))?;

        rows.iter().map(Self::row_to_user).collect()
    }
}
