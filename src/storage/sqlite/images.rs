//! SQLite implementation for image metadata storage

use crate::errors::StorageError;
use crate::storage::traits::{Image, ImageStore, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};

use super::parse_timestamp;

/// SQLite implementation of image metadata storage
pub struct SqliteImageStore {
    pool: SqlitePool,
}

impl SqliteImageStore {
    /// Create a new SQLite image store
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_image(row: &SqliteRow) -> Result<Image> {
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
            created_at: parse_timestamp(row, "created_at")?,
        })
    }
}

#[async_trait]
impl ImageStore for SqliteImageStore {
    async fn get_image(&self, image_id: i64) -> Result<Option<Image>> {
        let row = sqlx::query("SELECT * FROM images WHERE id = ?")
            .bind(image_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(format!("Failed to get image: {}", e)))?;

        row.as_ref().map(Self::row_to_image).transpose()
    }

    async fn insert_image(&self, title: &str, owner_id: &str) -> Result<Image> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO images (title, owner_id, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(title)
        .bind(owner_id)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Image {
            id: result.last_insert_rowid(),
            title: title.to_string(),
            owner_id: owner_id.to_string(),
            created_at,
        })
    }

    async fn delete_image(&self, image_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(image_id)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(format!("Failed to delete image: {}", e)))?;

        Ok(())
    }

    async fn list_images_for_user(&self, owner_id: &str) -> Result<Vec<Image>> {
        let rows = sqlx::query("SELECT * FROM images WHERE owner_id = ? ORDER BY id")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(format!("Failed to list images: {}", e)))?;

        rows.iter().map(Self::row_to_image).collect()
    }
}
