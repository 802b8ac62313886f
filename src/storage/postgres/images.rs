//! PostgreSQL implementation for image metadata storage

use crate::errors::StorageError;
use crate::storage::traits::{Image, ImageStore, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgRow};

/// PostgreSQL implementation of image metadata storage
pub struct PostgresImageStore {
    pool: PgPool,
}

impl PostgresImageStore {
    /// Create a new PostgreSQL image store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_image(row: &PgRow) -> Result<Image> {
        Ok(Image {
            id: row
                .try_get("id")
                .map_err(|e| StorageError::DatabaseError(format!("Failed to get id: {}", e)))?,
            title: row
                .try_get("title")
                .map_err(|e| StorageError::DatabaseError(format!("Failed to get title: {}", e)))?,
            owner_id: row.try_get("owner_id").map_err(|e| {
                StorageError::DatabaseError(format!("Failed to get owner_id: {}", e))
            })?,
            created_at: row.try_get("created_at").map_err(|e| {
                StorageError::DatabaseError(format!("Failed to get created_at: {}", e))
            })?,
        })
    }
}

#[async_trait]
impl ImageStore for PostgresImageStore {
    async fn get_image(&self, image_id: i64) -> Result<Option<Image>> {
        let row = sqlx::query("SELECT * FROM images WHERE id = $1")
            .bind(image_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(format!("Failed to get image: {}", e)))?;

        row.as_ref().map(Self::row_to_image).transpose()
    }

    async fn insert_image(&self, title: &str, owner_id: &str) -> Result<Image> {
        let row = sqlx::query(
            r#"
            INSERT INTO images (title, owner_id, created_at)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(owner_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_image(&row)
    }

    async fn delete_image(&self, image_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(image_id)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(format!("Failed to delete image: {}", e)))?;

        Ok(())
    }

    async fn list_images_for_user(&self, owner_id: &str) -> Result<Vec<Image>> {
        let rows = sqlx::query("SELECT * FROM images WHERE owner_id = $1 ORDER BY id")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(format!("Failed to list images: {}", e)))?;

        rows.iter().map(Self::row_to_image).collect()
    }
}
