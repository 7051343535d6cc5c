//! Link management service
//!
//! Publish, read, list and delete operations. Interfaces (CLI, daemon)
//! call into this service; none of them talk to the stores directly.

use std::num::NonZeroU64;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::access::{Decision, DenyReason, evaluate};
use super::accountant::ViewAccountant;
use crate::blob::{BlobHandle, BlobStore};
use crate::config::LinkConfig;
use crate::errors::{LinkVaultError, Result};
use crate::storage::{LinkKind, LinkRecord, LinkStore, OwnerId, Payload, ViewCharge};
use crate::utils::password::{Argon2Hasher, SecretHasher, process_new_password};
use crate::utils::{IdGenerator, RandomIdGenerator, is_valid_link_id};

// ============ Request/Response DTOs ============

/// Content of a link being published
#[derive(Debug, Clone)]
pub enum NewContent {
    Text(String),
    File {
        bytes: Bytes,
        original_name: Option<String>,
    },
}

/// How long a new link lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirySpec {
    /// Relative to creation; must be positive
    InMinutes(i64),
    /// Absolute instant; must be in the future
    At(DateTime<Utc>),
}

/// Request to create a new link
#[derive(Debug, Clone)]
pub struct CreateLinkRequest {
    pub content: NewContent,
    /// None = configured default
    pub expiry: Option<ExpirySpec>,
    /// None or empty = no password
    pub password: Option<String>,
    pub max_views: Option<u64>,
    pub owner: Option<OwnerId>,
}

impl CreateLinkRequest {
    pub fn text<T: Into<String>>(content: T) -> Self {
        Self {
            content: NewContent::Text(content.into()),
            expiry: None,
            password: None,
            max_views: None,
            owner: None,
        }
    }
}

/// Result of link creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkCreateResult {
    pub id: String,
    pub expires_at: DateTime<Utc>,
}

/// What a granted reader gets to see
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkView {
    pub id: String,
    pub kind: LinkKind,
    pub payload: Payload,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Count after this read was charged
    pub view_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Granted(LinkView),
    Denied(DenyReason),
}

impl ReadOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, ReadOutcome::Granted(_))
    }
}

/// Service-level link settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSettings {
    pub id_length: usize,
    pub default_expiry_minutes: i64,
    pub max_id_attempts: u32,
    pub max_file_bytes: usize,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self::from(&LinkConfig::default())
    }
}

impl From<&LinkConfig> for LinkSettings {
    fn from(config: &LinkConfig) -> Self {
        Self {
            id_length: config.id_length.clamp(1, 64),
            default_expiry_minutes: config.default_expiry_minutes,
            max_id_attempts: config.max_id_attempts.max(1),
            max_file_bytes: config.max_file_bytes,
        }
    }
}

// ============ LinkService Implementation ============

/// Service for link operations
///
/// Holds every collaborator explicitly. There is no global state behind
/// this type, so tests can swap any of them.
pub struct LinkService {
    store: Arc<dyn LinkStore>,
    blobs: Arc<dyn BlobStore>,
    hasher: Arc<dyn SecretHasher>,
    ids: Arc<dyn IdGenerator>,
    accountant: ViewAccountant,
    settings: LinkSettings,
}

impl LinkService {
    /// Create a service using Argon2 hashing and random ids
    pub fn new(store: Arc<dyn LinkStore>, blobs: Arc<dyn BlobStore>, settings: LinkSettings) -> Self {
        Self {
            accountant: ViewAccountant::new(store.clone()),
            store,
            blobs,
            hasher: Arc::new(Argon2Hasher),
            ids: Arc::new(RandomIdGenerator),
            settings,
        }
    }

    pub fn with_hasher(mut self, hasher: Arc<dyn SecretHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn LinkStore> {
        &self.store
    }

    /// Resolve the expiry instant for a link created at `now`
    fn resolve_expiry(&self, spec: Option<ExpirySpec>, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let minutes = match spec {
            Some(ExpirySpec::At(at)) => {
                if at <= now {
                    return Err(LinkVaultError::invalid_expiry(format!(
                        "Expiry {} is not in the future",
                        at.to_rfc3339()
                    )));
                }
                return Ok(at);
            }
            Some(ExpirySpec::InMinutes(m)) => m,
            None => self.settings.default_expiry_minutes,
        };

        if minutes <= 0 {
            return Err(LinkVaultError::invalid_expiry(format!(
                "Expiry must be a positive number of minutes, got {}",
                minutes
            )));
        }
        Duration::try_minutes(minutes)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| {
                LinkVaultError::invalid_expiry(format!("Expiry of {} minutes is out of range", minutes))
            })
    }

    fn validate_content(&self, content: &NewContent) -> Result<()> {
        match content {
            NewContent::Text(text) if text.is_empty() => {
                Err(LinkVaultError::validation("Content is required"))
            }
            NewContent::File { bytes, .. } if bytes.is_empty() => {
                Err(LinkVaultError::validation("File is empty"))
            }
            NewContent::File { bytes, .. } if bytes.len() > self.settings.max_file_bytes => {
                Err(LinkVaultError::validation(format!(
                    "File is {} bytes, limit is {} bytes",
                    bytes.len(),
                    self.settings.max_file_bytes
                )))
            }
            _ => Ok(()),
        }
    }

    /// Hash a new password off the async runtime
    async fn hash_password(&self, password: Option<String>) -> Result<Option<String>> {
        if password.as_deref().is_none_or(str::is_empty) {
            return Ok(None);
        }
        let hasher = self.hasher.clone();
        let hashed = tokio::task::spawn_blocking(move || {
            process_new_password(hasher.as_ref(), password.as_deref())
        })
        .await?
        .map_err(|e| {
            error!("Failed to hash password: {}", e);
            LinkVaultError::from(e)
        })?;
        Ok(hashed)
    }

    /// Best-effort removal of a blob uploaded for a link that never got stored
    async fn discard_blob(&self, handle: Option<&BlobHandle>) {
        let Some(handle) = handle else {
            return;
        };
        if let Err(e) = self.blobs.delete(handle).await {
            warn!("Failed to discard unused blob '{}': {}", handle, e);
        }
    }

    // ============ Operations ============

    /// Publish a new link
    pub async fn create_link(&self, req: CreateLinkRequest) -> Result<LinkCreateResult> {
        let now = Utc::now();

        self.validate_content(&req.content)?;

        let max_views = match req.max_views {
            None => None,
            Some(n) => Some(NonZeroU64::new(n).ok_or_else(|| {
                LinkVaultError::validation("max_views must be a positive integer")
            })?),
        };

        let expires_at = self.resolve_expiry(req.expiry, now)?;
        let password_hash = self.hash_password(req.password).await?;

        // 校验全部通过后才上传文件
        let payload = match req.content {
            NewContent::Text(content) => Payload::Text { content },
            NewContent::File {
                bytes,
                original_name,
            } => {
                let hint = original_name.as_deref().unwrap_or("upload");
                let handle = self.blobs.put(bytes, hint).await?;
                debug!("Uploaded blob '{}' to {}", handle, self.blobs.name());
                Payload::File {
                    handle,
                    original_name,
                }
            }
        };

        let mut record = LinkRecord {
            id: String::new(),
            payload,
            created_at: now,
            expires_at,
            password_hash,
            view_count: 0,
            max_views,
            owner_id: req.owner,
        };

        for attempt in 1..=self.settings.max_id_attempts {
            record.id = self.ids.generate(self.settings.id_length);
            match self.store.create(&record).await {
                Ok(()) => {
                    info!(
                        "LinkService: created {} link '{}' (expires {})",
                        record.kind(),
                        record.id,
                        record.expires_at.to_rfc3339()
                    );
                    return Ok(LinkCreateResult {
                        id: record.id,
                        expires_at: record.expires_at,
                    });
                }
                Err(LinkVaultError::DuplicateId(_)) => {
                    warn!(
                        "Id collision on '{}' (attempt {}/{})",
                        record.id, attempt, self.settings.max_id_attempts
                    );
                }
                Err(e) => {
                    self.discard_blob(record.payload.blob_handle()).await;
                    return Err(e);
                }
            }
        }

        self.discard_blob(record.payload.blob_handle()).await;
        error!(
            "Id generation exhausted after {} attempts",
            self.settings.max_id_attempts
        );
        Err(LinkVaultError::generation_exhausted(format!(
            "Could not allocate a unique id after {} attempts",
            self.settings.max_id_attempts
        )))
    }

    /// Read a link, charging one view when access is granted
    pub async fn read_link(&self, id: &str, password: Option<&str>) -> Result<ReadOutcome> {
        if !is_valid_link_id(id) {
            return Ok(ReadOutcome::Denied(DenyReason::NotFound));
        }

        let Some(record) = self.store.get(id).await? else {
            return Ok(ReadOutcome::Denied(DenyReason::NotFound));
        };

        let now = Utc::now();
        let decision = if record.is_password_protected()
            && password.is_some_and(|p| !p.is_empty())
            && record.is_live(now)
        {
            // Argon2 校验是 CPU 密集操作
            let hasher = self.hasher.clone();
            let candidate = password.map(str::to_string);
            let snapshot = record.clone();
            tokio::task::spawn_blocking(move || {
                evaluate(&snapshot, now, candidate.as_deref(), hasher.as_ref())
            })
            .await??
        } else {
            evaluate(&record, now, password, self.hasher.as_ref())?
        };

        if let Decision::Deny(reason) = decision {
            debug!("Read of '{}' denied: {}", id, reason);
            return Ok(ReadOutcome::Denied(reason));
        }

        // 评估时的计数可能已过期，以存储层的原子判断为准
        let view_count = match self.accountant.charge_view(id).await? {
            ViewCharge::Charged(count) => count,
            ViewCharge::LimitReached => {
                return Ok(ReadOutcome::Denied(DenyReason::ViewLimitReached));
            }
            ViewCharge::NotFound => return Ok(ReadOutcome::Denied(DenyReason::NotFound)),
        };

        Ok(ReadOutcome::Granted(LinkView {
            id: record.id.clone(),
            kind: record.kind(),
            payload: record.payload,
            created_at: record.created_at,
            expires_at: record.expires_at,
            view_count,
        }))
    }

    /// Links owned by `owner`, newest first, live or not
    pub async fn list_links(&self, owner: &OwnerId) -> Result<Vec<LinkRecord>> {
        self.store.list_by_owner(owner).await
    }

    /// Get a single link record without charging a view
    pub async fn get_link(&self, id: &str) -> Result<Option<LinkRecord>> {
        self.store.get(id).await
    }

    /// Delete a link on behalf of its owner
    pub async fn delete_link(&self, id: &str, caller: &OwnerId) -> Result<()> {
        let record = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| LinkVaultError::not_found(format!("Link '{}' not found", id)))?;

        if !record.is_owned_by(caller) {
            return Err(LinkVaultError::forbidden(format!(
                "Link '{}' is not owned by '{}'",
                id, caller
            )));
        }

        // 先删文件再删元数据，避免留下指向不存在内容的记录
        if let Some(handle) = record.payload.blob_handle() {
            if let Err(e) = self.blobs.delete(handle).await {
                warn!("Failed to delete blob '{}' of link '{}': {}", handle, id, e);
            }
        }

        self.store.delete(id).await?;
        info!("LinkService: deleted '{}'", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::MemoryBlobStore;
    use crate::storage::MemoryStore;

    fn service() -> LinkService {
        LinkService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryBlobStore::new()),
            LinkSettings::default(),
        )
    }

    #[test]
    fn test_resolve_expiry() {
        let svc = service();
        let now = Utc::now();

        assert_eq!(
            svc.resolve_expiry(None, now).unwrap(),
            now + Duration::minutes(10)
        );
        assert_eq!(
            svc.resolve_expiry(Some(ExpirySpec::InMinutes(90)), now).unwrap(),
            now + Duration::minutes(90)
        );
        let at = now + Duration::hours(2);
        assert_eq!(svc.resolve_expiry(Some(ExpirySpec::At(at)), now).unwrap(), at);

        for bad in [
            Some(ExpirySpec::InMinutes(0)),
            Some(ExpirySpec::InMinutes(-5)),
            Some(ExpirySpec::At(now)),
            Some(ExpirySpec::At(now - Duration::seconds(1))),
            Some(ExpirySpec::InMinutes(i64::MAX)),
        ] {
            assert!(matches!(
                svc.resolve_expiry(bad, now),
                Err(LinkVaultError::InvalidExpiry(_))
            ));
        }
    }

    #[test]
    fn test_validate_content() {
        let svc = service();
        assert!(svc.validate_content(&NewContent::Text("x".into())).is_ok());
        assert!(svc.validate_content(&NewContent::Text(String::new())).is_err());

        let empty = NewContent::File {
            bytes: Bytes::new(),
            original_name: None,
        };
        assert!(svc.validate_content(&empty).is_err());

        let too_big = NewContent::File {
            bytes: Bytes::from(vec![0u8; svc.settings.max_file_bytes + 1]),
            original_name: None,
        };
        assert!(matches!(
            svc.validate_content(&too_big),
            Err(LinkVaultError::Validation(_))
        ));
    }

    #[test]
    fn test_settings_are_clamped() {
        let config = LinkConfig {
            id_length: 0,
            max_id_attempts: 0,
            ..LinkConfig::default()
        };
        let settings = LinkSettings::from(&config);
        assert_eq!(settings.id_length, 1);
        assert_eq!(settings.max_id_attempts, 1);
    }

    #[tokio::test]
    async fn test_malformed_id_is_not_found() {
        let svc = service();
        assert_eq!(
            svc.read_link("../etc/passwd", None).await.unwrap(),
            ReadOutcome::Denied(DenyReason::NotFound)
        );
        assert_eq!(
            svc.read_link("", None).await.unwrap(),
            ReadOutcome::Denied(DenyReason::NotFound)
        );
    }
}
