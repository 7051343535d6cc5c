use std::fmt;
use std::num::NonZeroU64;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::blob::BlobHandle;

/// Opaque caller identity supplied by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new<T: Into<String>>(id: T) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LinkKind {
    Text,
    File,
}

/// What a link discloses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Payload {
    Text {
        content: String,
    },
    File {
        handle: BlobHandle,
        original_name: Option<String>,
    },
}

impl Payload {
    pub fn kind(&self) -> LinkKind {
        match self {
            Payload::Text { .. } => LinkKind::Text,
            Payload::File { .. } => LinkKind::File,
        }
    }

    /// External blob backing this payload, if any
    pub fn blob_handle(&self) -> Option<&BlobHandle> {
        match self {
            Payload::Text { .. } => None,
            Payload::File { handle, .. } => Some(handle),
        }
    }
}

/// One shareable piece of content
///
/// Everything except `view_count` is immutable after creation, and
/// `view_count` only moves through [`crate::storage::LinkStore::conditional_increment_view`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub id: String,
    pub payload: Payload,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub view_count: u64,
    pub max_views: Option<NonZeroU64>,
    pub owner_id: Option<OwnerId>,
}

impl LinkRecord {
    pub fn kind(&self) -> LinkKind {
        self.payload.kind()
    }

    pub fn is_password_protected(&self) -> bool {
        self.password_hash.is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn views_exhausted(&self) -> bool {
        self.max_views
            .is_some_and(|max| self.view_count >= max.get())
    }

    /// Liveness is derived, never stored.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now) && !self.views_exhausted()
    }

    pub fn is_owned_by(&self, caller: &OwnerId) -> bool {
        self.owner_id.as_ref() == Some(caller)
    }
}

/// Result of the store's atomic conditional increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCharge {
    /// Counter incremented; carries the new count
    Charged(u64),
    LimitReached,
    NotFound,
}

/// One page of expired rows
///
/// Rows the store could not decode are kept by id so the sweeper can still
/// remove their metadata; their blobs, if any, cannot be located.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpiredBatch {
    pub records: Vec<LinkRecord>,
    pub unreadable: Vec<String>,
}

impl ExpiredBatch {
    /// Rows fetched, readable or not
    pub fn len(&self) -> usize {
        self.records.len() + self.unreadable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.id.clone())
            .chain(self.unreadable.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(view_count: u64, max_views: Option<u64>) -> LinkRecord {
        let now = Utc::now();
        LinkRecord {
            id: "abc123".to_string(),
            payload: Payload::Text {
                content: "hello".to_string(),
            },
            created_at: now,
            expires_at: now + Duration::minutes(10),
            password_hash: None,
            view_count,
            max_views: max_views.and_then(NonZeroU64::new),
            owner_id: None,
        }
    }

    #[test]
    fn test_liveness_is_derived() {
        let now = Utc::now();
        assert!(record(0, None).is_live(now));
        assert!(record(2, Some(3)).is_live(now));
        assert!(!record(3, Some(3)).is_live(now));
        assert!(!record(0, None).is_live(now + Duration::minutes(11)));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let link = record(0, None);
        assert!(link.is_expired(link.expires_at));
        assert!(!link.is_expired(link.expires_at - Duration::milliseconds(1)));
    }

    #[test]
    fn test_kind_string_forms() {
        assert_eq!(LinkKind::Text.as_ref(), "text");
        assert_eq!("file".parse::<LinkKind>().unwrap(), LinkKind::File);
        assert!("folder".parse::<LinkKind>().is_err());
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let mut link = record(0, None);
        link.password_hash = Some("$argon2id$secret".to_string());
        let json = serde_json::to_string(&link).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("\"kind\":\"text\""));
    }

    #[test]
    fn test_ownership() {
        let mut link = record(0, None);
        assert!(!link.is_owned_by(&OwnerId::new("alice")));
        link.owner_id = Some(OwnerId::new("alice"));
        assert!(link.is_owned_by(&OwnerId::new("alice")));
        assert!(!link.is_owned_by(&OwnerId::new("bob")));
    }
}
