use std::num::NonZeroU64;

use crate::blob::BlobHandle;
use crate::errors::{LinkVaultError, Result};
use crate::storage::{LinkKind, LinkRecord, OwnerId, Payload};
use migration::entities::link;

/// 将 Sea-ORM Model 转换为 LinkRecord
pub fn model_to_record(model: link::Model) -> Result<LinkRecord> {
    let kind: LinkKind = model.kind.parse().map_err(|_| {
        LinkVaultError::serialization(format!(
            "Link '{}' has unknown kind '{}'",
            model.id, model.kind
        ))
    })?;

    let payload = match kind {
        LinkKind::Text => Payload::Text {
            content: model.content,
        },
        LinkKind::File => Payload::File {
            handle: BlobHandle::new(model.content),
            original_name: model.original_name,
        },
    };

    Ok(LinkRecord {
        id: model.id,
        payload,
        created_at: model.created_at,
        expires_at: model.expires_at,
        password_hash: model.password_hash,
        view_count: u64::try_from(model.view_count).unwrap_or(0),
        // 非正数按未设置处理
        max_views: model
            .max_views
            .and_then(|v| u64::try_from(v).ok())
            .and_then(NonZeroU64::new),
        owner_id: model.owner_id.map(OwnerId::new),
    })
}

/// 将 LinkRecord 转换为 ActiveModel（仅用于插入）
pub fn record_to_active_model(record: &LinkRecord) -> link::ActiveModel {
    use sea_orm::ActiveValue::Set;

    let (content, original_name) = match &record.payload {
        Payload::Text { content } => (content.clone(), None),
        Payload::File {
            handle,
            original_name,
        } => (handle.as_str().to_string(), original_name.clone()),
    };

    link::ActiveModel {
        id: Set(record.id.clone()),
        kind: Set(record.kind().as_ref().to_string()),
        content: Set(content),
        original_name: Set(original_name),
        created_at: Set(record.created_at),
        expires_at: Set(record.expires_at),
        password_hash: Set(record.password_hash.clone()),
        view_count: Set(i64::try_from(record.view_count).unwrap_or(i64::MAX)),
        max_views: Set(record
            .max_views
            .map(|v| i64::try_from(v.get()).unwrap_or(i64::MAX))),
        owner_id: Set(record.owner_id.as_ref().map(|o| o.as_str().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::ActiveValue;

    fn file_model() -> link::Model {
        let now = Utc::now();
        link::Model {
            id: "Fi1eId".to_string(),
            kind: "file".to_string(),
            content: "0a1b-report.pdf".to_string(),
            original_name: Some("report.pdf".to_string()),
            created_at: now,
            expires_at: now + Duration::minutes(10),
            password_hash: None,
            view_count: 2,
            max_views: Some(5),
            owner_id: Some("alice".to_string()),
        }
    }

    #[test]
    fn test_model_to_record_file() {
        let record = model_to_record(file_model()).unwrap();

        assert_eq!(record.kind(), LinkKind::File);
        assert_eq!(
            record.payload.blob_handle(),
            Some(&BlobHandle::new("0a1b-report.pdf"))
        );
        assert_eq!(record.view_count, 2);
        assert_eq!(record.max_views.map(|v| v.get()), Some(5));
        assert_eq!(record.owner_id, Some(OwnerId::new("alice")));
    }

    #[test]
    fn test_model_to_record_sanitizes_counters() {
        let mut model = file_model();
        model.view_count = -3;
        model.max_views = Some(0);

        let record = model_to_record(model).unwrap();
        assert_eq!(record.view_count, 0);
        assert!(record.max_views.is_none());
    }

    #[test]
    fn test_model_to_record_rejects_unknown_kind() {
        let mut model = file_model();
        model.kind = "folder".to_string();
        assert!(model_to_record(model).is_err());
    }

    #[test]
    fn test_text_record_to_active_model() {
        let record = LinkRecord {
            id: "Txt123".to_string(),
            payload: Payload::Text {
                content: "hello".to_string(),
            },
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::minutes(1),
            password_hash: Some("$argon2id$x".to_string()),
            view_count: 0,
            max_views: None,
            owner_id: None,
        };

        let active = record_to_active_model(&record);
        assert!(matches!(active.kind, ActiveValue::Set(ref k) if k == "text"));
        assert!(matches!(active.content, ActiveValue::Set(ref c) if c == "hello"));
        assert!(matches!(active.original_name, ActiveValue::Set(None)));
        assert!(matches!(active.max_views, ActiveValue::Set(None)));
        assert!(matches!(active.owner_id, ActiveValue::Set(None)));
    }
}
