//! Product image storage on the local filesystem.

use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// URL prefix the stored files are served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Writes uploaded images into one directory under generated names.
#[derive(Debug, Clone)]
pub struct ImageStorage {
    dir: PathBuf,
}

impl ImageStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Store `bytes` and return the public URL of the new file.
    ///
    /// The extension of `original_name` decides whether the upload is
    /// accepted; the stored name is a fresh UUID.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> ProductResult<String> {
        let extension = image_extension(original_name).ok_or_else(|| {
            ProductError::InvalidRequest(format!(
                "Unsupported image type '{}'; allowed: {}",
                original_name,
                ALLOWED_EXTENSIONS.join(", ")
            ))
        })?;

        let file_name = format!("{}.{}", Uuid::now_v7(), extension);
        self.ensure_dir().await?;
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;

        tracing::info!(file = %file_name, size = bytes.len(), "Stored product image");
        Ok(format!("{}/{}", PUBLIC_PREFIX, file_name))
    }

    /// Best-effort removal of a file previously returned by [`save`](Self::save).
    pub async fn discard(&self, url: &str) {
        let Some(file_name) = url
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return;
        };
        if file_name.contains('/') || file_name.contains("..") {
            return;
        }

        if let Err(e) = tokio::fs::remove_file(self.dir.join(file_name)).await {
            tracing::warn!(file = %file_name, error = %e, "Failed to remove product image");
        }
    }
}

/// Lowercased extension of `name` if it is an allowed image type.
fn image_extension(name: &str) -> Option<String> {
    let extension = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    ALLOWED_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}
