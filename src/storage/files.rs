//! JPEG file storage on the local filesystem.
//!
//! Files live at `<root>/<owner_id>/<image_id>.jpg`. Owner ids are validated
//! user ids, so they are always safe path components.

use std::io::ErrorKind;
use std::path::PathBuf;

use crate::errors::ImageError;

/// Check the JPEG magic number: raw/JFIF/Exif headers only.
pub fn is_jpeg(bytes: &[u8]) -> bool {
    let Some(magic) = read_u32(bytes, 0) else {
        return false;
    };

    match magic {
        0xFFD8FFDB | 0xFFD8FFEE => true,
        // APP0 segment length followed by "JFIF\0" and version 1
        0xFFD8FFE0 => read_u32(bytes, 4) == Some(0x00104A46) && read_u32(bytes, 8) == Some(0x49460001),
        // APP1 segment length followed by "Exif\0\0"
        0xFFD8FFE1 => {
            bytes.get(6..8) == Some(&[0x45, 0x78][..]) && read_u32(bytes, 8) == Some(0x69660000)
        }
        _ => false,
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let chunk: [u8; 4] = bytes.get(offset..offset + 4)?.try_into().ok()?;
    Some(u32::from_be_bytes(chunk))
}

/// Image byte storage rooted at the configured upload directory
#[derive(Debug, Clone)]
pub struct ImageFiles {
    root: PathBuf,
}

impl ImageFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn owner_dir(&self, owner_id: &str) -> PathBuf {
        self.root.join(owner_id)
    }

    pub fn image_path(&self, owner_id: &str, image_id: i64) -> PathBuf {
        self.owner_dir(owner_id).join(format!("{}.jpg", image_id))
    }

    /// Write image bytes, creating the owner directory when needed
    pub async fn save(&self, owner_id: &str, image_id: i64, bytes: &[u8]) -> Result<(), ImageError> {
        if !is_jpeg(bytes) {
            return Err(ImageError::UnsupportedFileType);
        }

        tokio::fs::create_dir_all(self.owner_dir(owner_id)).await?;
        tokio::fs::write(self.image_path(owner_id, image_id), bytes).await?;
        Ok(())
    }

    /// Read image bytes; `None` when the file is gone
    pub async fn load(&self, owner_id: &str, image_id: i64) -> Result<Option<Vec<u8>>, ImageError> {
        match tokio::fs::read(self.image_path(owner_id, image_id)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, owner_id: &str, image_id: i64) -> Result<(), ImageError> {
        match tokio::fs::remove_file(self.image_path(owner_id, image_id)).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// Remove every file belonging to an owner
    pub async fn delete_owner(&self, owner_id: &str) -> Result<(), ImageError> {
        match tokio::fs::remove_dir_all(self.owner_dir(owner_id)).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
