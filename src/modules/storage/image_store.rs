use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::core::config::MediaConfig;
use crate::core::error::{AppError, Result};

/// Local-filesystem store for ad images, served under a public URL prefix.
pub struct ImageStore {
    root: PathBuf,
    url_prefix: String,
}

impl ImageStore {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root),
            url_prefix: config.url_prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Directory served as static media
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes the image under `ads/{ad_id}/` and returns its storage key.
    pub async fn save(&self, ad_id: i64, extension: &str, data: Vec<u8>) -> Result<String> {
        let key = format!("ads/{}/{}.{}", ad_id, Uuid::new_v4(), extension);
        let path = self.root.join(&key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Internal(format!("Failed to create media directory: {}", e))
            })?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store image: {}", e)))?;

        tracing::debug!("Image written: {}", path.display());
        Ok(key)
    }

    /// Public URL for a stored key
    pub fn url(&self, key: &str) -> String {
        format!("{}/{}", self.url_prefix, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &Path) -> ImageStore {
        ImageStore::new(&MediaConfig {
            root: dir.to_string_lossy().into_owned(),
            url_prefix: "/media/".to_string(),
        })
    }

    #[tokio::test]
    async fn save_writes_file_under_ad_directory() {
        let dir = std::env::temp_dir().join(format!("adboard-test-{}", Uuid::new_v4()));
        let store = store_in(&dir);

        let key = store.save(7, "jpg", b"fake image".to_vec()).await.unwrap();
        assert!(key.starts_with("ads/7/"));
        assert!(key.ends_with(".jpg"));

        let written = tokio::fs::read(dir.join(&key)).await.unwrap();
        assert_eq!(written, b"fake image");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[test]
    fn url_joins_prefix_without_double_slash() {
        let store = store_in(Path::new("media"));
        assert_eq!(store.url("ads/7/x.jpg"), "/media/ads/7/x.jpg");
    }
}
