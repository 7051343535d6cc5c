use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, info};

use super::{BlobHandle, BlobStore, sanitize_name};
use crate::errors::{LinkVaultError, Result};

/// Blob store backed by a local directory
///
/// Handles are file names of the form `<uuid>-<sanitized name>` directly
/// under the root.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub async fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            LinkVaultError::blob_storage(format!(
                "无法创建 blob 目录 {}: {}",
                root.display(),
                e
            ))
        })?;
        info!("Blob store rooted at {}", root.display());
        Ok(Self { root })
    }

    /// Local path of a stored blob. Rejects handles that would leave the root.
    pub fn path_for(&self, handle: &BlobHandle) -> Result<PathBuf> {
        let raw = handle.as_str();
        if raw.is_empty()
            || raw.contains('/')
            || raw.contains('\\')
            || raw.starts_with('.')
        {
            return Err(LinkVaultError::blob_storage(format!(
                "Invalid blob handle: '{}'",
                raw
            )));
        }
        Ok(self.root.join(raw))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    fn name(&self) -> &'static str {
        "fs"
    }

    async fn put(&self, bytes: Bytes, name_hint: &str) -> Result<BlobHandle> {
        let handle = BlobHandle::new(format!(
            "{}-{}",
            uuid::Uuid::new_v4().simple(),
            sanitize_name(name_hint)
        ));
        let path = self.path_for(&handle)?;

        tokio::fs::write(&path, &bytes).await.map_err(|e| {
            LinkVaultError::blob_storage(format!("写入 blob 失败 {}: {}", path.display(), e))
        })?;

        debug!("Stored blob {} ({} bytes)", handle, bytes.len());
        Ok(handle)
    }

    async fn delete(&self, handle: &BlobHandle) -> Result<()> {
        let path = self.path_for(handle)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted blob {}", handle);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Blob {} already gone", handle);
                Ok(())
            }
            Err(e) => Err(LinkVaultError::blob_storage(format!(
                "删除 blob 失败 {}: {}",
                handle, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_then_delete() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();

        let handle = store
            .put(Bytes::from_static(b"hello"), "notes v1.txt")
            .await
            .unwrap();
        assert!(handle.as_str().ends_with("-notes_v1.txt"));

        let path = store.path_for(&handle).unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"hello");

        store.delete(&handle).await.unwrap();
        assert!(!path.exists());

        // 幂等：重复删除不报错
        store.delete(&handle).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_escaping_handles() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();

        assert!(store.path_for(&BlobHandle::new("../outside")).is_err());
        assert!(store.path_for(&BlobHandle::new("a/b")).is_err());
        assert!(store.delete(&BlobHandle::new("..")).await.is_err());
    }
}
