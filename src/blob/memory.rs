use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use super::{BlobHandle, BlobStore, sanitize_name};
use crate::errors::Result;

/// In-process blob store
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<BlobHandle, Bytes>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: &BlobHandle) -> Option<Bytes> {
        self.blobs.get(handle).map(|b| b.value().clone())
    }

    pub fn contains(&self, handle: &BlobHandle) -> bool {
        self.blobs.contains_key(handle)
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, bytes: Bytes, name_hint: &str) -> Result<BlobHandle> {
        let handle = BlobHandle::new(format!(
            "{}-{}",
            uuid::Uuid::new_v4().simple(),
            sanitize_name(name_hint)
        ));
        self.blobs.insert(handle.clone(), bytes);
        Ok(handle)
    }

    async fn delete(&self, handle: &BlobHandle) -> Result<()> {
        self.blobs.remove(handle);
        Ok(())
    }
}
