//! External blob storage
//!
//! File links keep their bytes outside the link store. The engine only needs
//! to put bytes once and delete them later by an opaque handle.

mod fs;
mod memory;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::config::BlobConfig;
use crate::errors::{LinkVaultError, Result};

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;

/// Opaque reference to stored bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobHandle(String);

impl BlobHandle {
    pub fn new<T: Into<String>>(handle: T) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    fn name(&self) -> &'static str;

    async fn put(&self, bytes: Bytes, name_hint: &str) -> Result<BlobHandle>;

    /// Deleting a handle that no longer exists succeeds.
    async fn delete(&self, handle: &BlobHandle) -> Result<()>;
}

/// 将原始文件名转换为安全的存储名（空白 -> `_`，去掉路径分隔符）
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\') && !c.is_control())
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "blob".to_string()
    } else {
        cleaned.chars().take(128).collect()
    }
}

pub struct BlobStoreFactory;

impl BlobStoreFactory {
    pub async fn create(config: &BlobConfig) -> Result<Arc<dyn BlobStore>> {
        match config.backend.as_str() {
            "fs" => Ok(Arc::new(FsBlobStore::open(&config.root).await?)),
            "memory" => Ok(Arc::new(MemoryBlobStore::new())),
            other => Err(LinkVaultError::config(format!(
                "Unknown blob backend '{}'. Supported: fs, memory",
                other
            ))),
        }
    }
}
