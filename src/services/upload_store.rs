// src/services/upload_store.rs
use crate::errors::TextLensError;
use crate::models::StoredFile;
use log::debug;
use std::path::PathBuf;

/// Filesystem store for uploaded images.
///
/// Files are written under a single scoped directory with a
/// timestamp-prefixed name. Two uploads of the same filename in the same
/// millisecond would collide; the prefix is collision avoidance, not a
/// guarantee.
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile, TextLensError> {
        // Directory creation is lazy and idempotent.
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| TextLensError::Processing(format!("Failed to create upload dir: {}", e)))?;

        // Keep only the final path component of the client-supplied name.
        let base_name = original_name
            .rsplit(['/', '\\'])
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("upload");

        let stored_name = format!("{}-{}", chrono::Utc::now().timestamp_millis(), base_name);
        let path = self.root.join(&stored_name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| TextLensError::Processing(format!("Failed to store upload: {}", e)))?;

        debug!("Stored upload {} ({} bytes)", path.display(), bytes.len());

        Ok(StoredFile {
            name: original_name.to_string(),
            path,
            size: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_directory_lazily_and_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("uploads");
        assert!(!root.exists());

        let store = UploadStore::new(&root);
        let stored = store.save("receipt.png", b"fake-bytes").await.unwrap();

        assert!(root.exists());
        assert!(stored.path.exists());
        assert_eq!(stored.name, "receipt.png");
        assert_eq!(stored.size, 10);
        assert_eq!(tokio::fs::read(&stored.path).await.unwrap(), b"fake-bytes");
    }

    #[tokio::test]
    async fn stored_name_is_timestamp_prefixed() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let stored = store.save("scan.jpg", b"x").await.unwrap();
        let file_name = stored.path.file_name().unwrap().to_str().unwrap();
        assert!(file_name.ends_with("-scan.jpg"));
        let prefix = file_name.strip_suffix("-scan.jpg").unwrap();
        assert!(prefix.parse::<i64>().is_ok());
    }

    #[tokio::test]
    async fn client_path_components_are_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let stored = store.save("../../etc/passwd.png", b"x").await.unwrap();
        let file_name = stored.path.file_name().unwrap().to_str().unwrap();
        assert!(file_name.ends_with("-passwd.png"));
        assert_eq!(stored.path.parent().unwrap(), dir.path());
    }
}
