//! Expiry sweeper tests
//!
//! Blob failures must never keep expired metadata around: a leaked blob is
//! accepted, a record pointing at deleted content is not.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use linkvault::blob::{BlobHandle, BlobStore, MemoryBlobStore};
use linkvault::errors::{LinkVaultError, Result};
use linkvault::services::{ExpirySweeper, SweeperSettings};
use linkvault::config::DatabaseConfig;
use linkvault::storage::{LinkRecord, LinkStore, MemoryStore, Payload, SeaOrmStorage};
use migration::entities::link;
use sea_orm::{ActiveValue::Set, EntityTrait};
use tempfile::TempDir;

// =============================================================================
// Test doubles
// =============================================================================

/// Every delete fails
#[derive(Default)]
struct FailingBlobStore {
    attempts: AtomicUsize,
}

#[async_trait]
impl BlobStore for FailingBlobStore {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn put(&self, _bytes: Bytes, name_hint: &str) -> Result<BlobHandle> {
        Ok(BlobHandle::new(name_hint))
    }

    async fn delete(&self, _handle: &BlobHandle) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(LinkVaultError::blob_storage("remote store unavailable"))
    }
}

/// Every delete hangs until the sweeper gives up
struct HangingBlobStore;

#[async_trait]
impl BlobStore for HangingBlobStore {
    fn name(&self) -> &'static str {
        "hanging"
    }

    async fn put(&self, _bytes: Bytes, name_hint: &str) -> Result<BlobHandle> {
        Ok(BlobHandle::new(name_hint))
    }

    async fn delete(&self, _handle: &BlobHandle) -> Result<()> {
        tokio::time::sleep(StdDuration::from_secs(3600)).await;
        Ok(())
    }
}

fn text_record(id: &str, expires_at: DateTime<Utc>) -> LinkRecord {
    LinkRecord {
        id: id.to_string(),
        payload: Payload::Text {
            content: format!("content of {}", id),
        },
        created_at: expires_at - Duration::minutes(10),
        expires_at,
        password_hash: None,
        view_count: 0,
        max_views: None,
        owner_id: None,
    }
}

fn file_record(id: &str, handle: BlobHandle, expires_at: DateTime<Utc>) -> LinkRecord {
    LinkRecord {
        payload: Payload::File {
            handle,
            original_name: Some(format!("{}.bin", id)),
        },
        ..text_record(id, expires_at)
    }
}

fn settings(batch_size: u64, max_batches: u32) -> SweeperSettings {
    SweeperSettings {
        interval: StdDuration::from_millis(50),
        batch_size,
        max_batches_per_cycle: max_batches,
        blob_delete_timeout: StdDuration::from_millis(200),
    }
}

// =============================================================================
// Single cycle behaviour
// =============================================================================

#[tokio::test]
async fn test_sweep_deletes_only_expired_records() {
    let store = Arc::new(MemoryStore::new());
    let now = Utc::now();
    store.create(&text_record("old1", now - Duration::minutes(5))).await.unwrap();
    store.create(&text_record("old2", now - Duration::seconds(1))).await.unwrap();
    store.create(&text_record("edge", now)).await.unwrap();
    store.create(&text_record("live", now + Duration::minutes(5))).await.unwrap();

    let sweeper = ExpirySweeper::new(store.clone(), Arc::new(MemoryBlobStore::new()), settings(100, 10));
    let report = sweeper.run_cycle_at(now).await.unwrap();

    // expires_at == now 视为已过期
    assert_eq!(report.expired_found, 3);
    assert_eq!(report.records_deleted, 3);
    assert!(store.get("live").await.unwrap().is_some());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_blobs_are_deleted_with_records() {
    let store = Arc::new(MemoryStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let now = Utc::now();

    let expired_handle = blobs.put(Bytes::from_static(b"old"), "old.bin").await.unwrap();
    let live_handle = blobs.put(Bytes::from_static(b"new"), "new.bin").await.unwrap();
    store
        .create(&file_record("expf", expired_handle.clone(), now - Duration::minutes(1)))
        .await
        .unwrap();
    store
        .create(&file_record("livef", live_handle.clone(), now + Duration::minutes(1)))
        .await
        .unwrap();

    let sweeper = ExpirySweeper::new(store.clone(), blobs.clone(), settings(100, 10));
    let report = sweeper.run_cycle_at(now).await.unwrap();

    assert_eq!(report.blobs_deleted, 1);
    assert_eq!(report.blob_failures, 0);
    assert!(!blobs.contains(&expired_handle));
    assert!(blobs.contains(&live_handle));
    assert!(store.get("expf").await.unwrap().is_none());
}

#[tokio::test]
async fn test_blob_failure_still_deletes_metadata() {
    let store = Arc::new(MemoryStore::new());
    let blobs = Arc::new(FailingBlobStore::default());
    let past = Utc::now() - Duration::minutes(1);

    store
        .create(&file_record("f1", BlobHandle::new("h1"), past))
        .await
        .unwrap();
    store
        .create(&file_record("f2", BlobHandle::new("h2"), past))
        .await
        .unwrap();
    store.create(&text_record("t1", past)).await.unwrap();

    let sweeper = ExpirySweeper::new(store.clone(), blobs.clone(), settings(100, 10));
    let report = sweeper.run_cycle().await.unwrap();

    // 孤立的 blob 可以接受，悬空的元数据不行
    assert_eq!(blobs.attempts.load(Ordering::SeqCst), 2);
    assert_eq!(report.blob_failures, 2);
    assert_eq!(report.blobs_deleted, 0);
    assert_eq!(report.records_deleted, 3);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_hanging_blob_delete_times_out() {
    let store = Arc::new(MemoryStore::new());
    let past = Utc::now() - Duration::minutes(1);
    store
        .create(&file_record("slow", BlobHandle::new("h"), past))
        .await
        .unwrap();

    let sweeper = ExpirySweeper::new(store.clone(), Arc::new(HangingBlobStore), settings(100, 10));
    let report = tokio::time::timeout(StdDuration::from_secs(5), sweeper.run_cycle())
        .await
        .expect("sweep should not hang")
        .unwrap();

    assert_eq!(report.blob_failures, 1);
    assert_eq!(report.records_deleted, 1);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_sweep_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let past = Utc::now() - Duration::minutes(1);
    for i in 0..5 {
        store.create(&text_record(&format!("r{}", i), past)).await.unwrap();
    }

    let sweeper = ExpirySweeper::new(store.clone(), Arc::new(MemoryBlobStore::new()), settings(100, 10));
    let first = sweeper.run_cycle().await.unwrap();
    assert_eq!(first.records_deleted, 5);

    let second = sweeper.run_cycle().await.unwrap();
    assert_eq!(second.expired_found, 0);
    assert_eq!(second.records_deleted, 0);
    assert_eq!(second.batches, 0);
}

#[tokio::test]
async fn test_sweep_pages_through_batches() {
    let store = Arc::new(MemoryStore::new());
    let past = Utc::now() - Duration::minutes(1);
    for i in 0..25 {
        store.create(&text_record(&format!("p{:02}", i), past)).await.unwrap();
    }

    let sweeper = ExpirySweeper::new(store.clone(), Arc::new(MemoryBlobStore::new()), settings(10, 10));
    let report = sweeper.run_cycle().await.unwrap();

    assert_eq!(report.batches, 3);
    assert_eq!(report.records_deleted, 25);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_batch_cap_leaves_rest_for_next_cycle() {
    let store = Arc::new(MemoryStore::new());
    let past = Utc::now() - Duration::minutes(1);
    for i in 0..25 {
        store.create(&text_record(&format!("c{:02}", i), past)).await.unwrap();
    }

    let sweeper = ExpirySweeper::new(store.clone(), Arc::new(MemoryBlobStore::new()), settings(10, 2));
    let first = sweeper.run_cycle().await.unwrap();
    assert_eq!(first.batches, 2);
    assert_eq!(first.records_deleted, 20);
    assert_eq!(store.len(), 5);

    let second = sweeper.run_cycle().await.unwrap();
    assert_eq!(second.records_deleted, 5);
    assert!(store.is_empty());
}

// =============================================================================
// Unreadable rows
// =============================================================================

#[tokio::test]
async fn test_unreadable_expired_row_does_not_stall_sweep() {
    let temp_dir = TempDir::new().unwrap();
    let config = DatabaseConfig {
        database_url: format!(
            "sqlite://{}?mode=rwc",
            temp_dir.path().join("sweep.db").display()
        ),
        ..DatabaseConfig::default()
    };
    let storage = Arc::new(SeaOrmStorage::connect(&config).await.unwrap());
    let now = Utc::now();

    // 未知 kind 的行排在最前面
    link::Entity::insert(link::ActiveModel {
        id: Set("bad001".to_string()),
        kind: Set("folder".to_string()),
        content: Set("somewhere".to_string()),
        original_name: Set(None),
        created_at: Set(now - Duration::hours(2)),
        expires_at: Set(now - Duration::hours(1)),
        password_hash: Set(None),
        view_count: Set(0),
        max_views: Set(None),
        owner_id: Set(None),
    })
    .exec(storage.get_db())
    .await
    .unwrap();
    storage
        .create(&text_record("good01", now - Duration::minutes(1)))
        .await
        .unwrap();

    let sweeper = ExpirySweeper::new(storage.clone(), Arc::new(MemoryBlobStore::new()), settings(1, 10));
    let report = sweeper.run_cycle_at(now).await.unwrap();

    assert_eq!(report.expired_found, 2);
    assert_eq!(report.unreadable, 1);
    assert_eq!(report.records_deleted, 2);
    assert!(storage.get("good01").await.unwrap().is_none());
    assert!(storage.find_expired(now, 10).await.unwrap().is_empty());
}

// =============================================================================
// Background loop
// =============================================================================

#[tokio::test]
async fn test_spawned_sweeper_runs_and_shuts_down() {
    let store = Arc::new(MemoryStore::new());
    let past = Utc::now() - Duration::minutes(1);
    store.create(&text_record("bg1", past)).await.unwrap();

    let sweeper = Arc::new(ExpirySweeper::new(
        store.clone(),
        Arc::new(MemoryBlobStore::new()),
        settings(100, 10),
    ));
    let handle = sweeper.spawn();

    // 第一次 tick 立即触发
    let mut waited = 0;
    while !store.is_empty() && waited < 50 {
        tokio::time::sleep(StdDuration::from_millis(20)).await;
        waited += 1;
    }
    assert!(store.is_empty());

    // 后续过期的记录由下一次 tick 清理
    store.create(&text_record("bg2", Utc::now() - Duration::seconds(1))).await.unwrap();
    let mut waited = 0;
    while !store.is_empty() && waited < 50 {
        tokio::time::sleep(StdDuration::from_millis(20)).await;
        waited += 1;
    }
    assert!(store.is_empty());

    assert!(!handle.is_finished());
    tokio::time::timeout(StdDuration::from_secs(2), handle.shutdown())
        .await
        .expect("shutdown should complete")
        .unwrap();
}
