//! Access evaluation
//!
//! Decides whether a caller may see a link's payload. The check order is
//! fixed (expiry, then view limit, then password) so that an expired or
//! exhausted link never reveals that it is password protected.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{AsRefStr, Display};

use crate::errors::Result;
use crate::storage::LinkRecord;
use crate::utils::password::SecretHasher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DenyReason {
    Expired,
    ViewLimitReached,
    PasswordRequired,
    PasswordIncorrect,
    /// No such link. Only produced by the read path, never by [`evaluate`].
    NotFound,
}

impl DenyReason {
    /// Caller-facing message. Missing and expired links share one message
    /// so the response does not reveal whether an id ever existed.
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::Expired | DenyReason::NotFound => {
                "Access denied (link invalid or expired)"
            }
            DenyReason::ViewLimitReached => "Access denied (view limit reached)",
            DenyReason::PasswordRequired => "Password required",
            DenyReason::PasswordIncorrect => "Incorrect password",
        }
    }

    /// The caller is allowed to learn the link is password protected.
    pub fn is_password_challenge(&self) -> bool {
        matches!(
            self,
            DenyReason::PasswordRequired | DenyReason::PasswordIncorrect
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Evaluate `record` at `now` against the supplied password.
///
/// An empty candidate counts as no password. Only a malformed stored digest
/// produces an error.
pub fn evaluate(
    record: &LinkRecord,
    now: DateTime<Utc>,
    candidate_password: Option<&str>,
    hasher: &dyn SecretHasher,
) -> Result<Decision> {
    if record.is_expired(now) {
        return Ok(Decision::Deny(DenyReason::Expired));
    }

    if record.views_exhausted() {
        return Ok(Decision::Deny(DenyReason::ViewLimitReached));
    }

    if let Some(digest) = record.password_hash.as_deref() {
        let Some(candidate) = candidate_password.filter(|p| !p.is_empty()) else {
            return Ok(Decision::Deny(DenyReason::PasswordRequired));
        };
        if !hasher.verify(candidate, digest)? {
            return Ok(Decision::Deny(DenyReason::PasswordIncorrect));
        }
    }

    Ok(Decision::Allow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Payload;
    use crate::utils::password::PasswordError;
    use chrono::Duration;
    use std::num::NonZeroU64;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Plain comparison, counts verify calls
    #[derive(Default)]
    struct CountingHasher {
        verifications: AtomicUsize,
    }

    impl SecretHasher for CountingHasher {
        fn hash(&self, plaintext: &str) -> std::result::Result<String, PasswordError> {
            Ok(format!("plain:{}", plaintext))
        }

        fn verify(&self, plaintext: &str, digest: &str) -> std::result::Result<bool, PasswordError> {
            self.verifications.fetch_add(1, Ordering::SeqCst);
            Ok(digest == format!("plain:{}", plaintext))
        }
    }

    fn record(now: DateTime<Utc>) -> LinkRecord {
        LinkRecord {
            id: "abc123".to_string(),
            payload: Payload::Text {
                content: "hello".to_string(),
            },
            created_at: now - Duration::minutes(1),
            expires_at: now + Duration::minutes(9),
            password_hash: None,
            view_count: 0,
            max_views: None,
            owner_id: None,
        }
    }

    fn protected(now: DateTime<Utc>) -> LinkRecord {
        LinkRecord {
            password_hash: Some("plain:secret".to_string()),
            ..record(now)
        }
    }

    #[test]
    fn test_open_link_is_allowed() {
        let now = Utc::now();
        let hasher = CountingHasher::default();
        assert_eq!(
            evaluate(&record(now), now, None, &hasher).unwrap(),
            Decision::Allow
        );
    }

    #[test]
    fn test_expired_wins_over_everything() {
        let now = Utc::now();
        let hasher = CountingHasher::default();
        let mut link = protected(now);
        link.max_views = NonZeroU64::new(1);
        link.view_count = 1;
        let later = link.expires_at + Duration::seconds(1);

        for candidate in [None, Some("secret"), Some("wrong")] {
            assert_eq!(
                evaluate(&link, later, candidate, &hasher).unwrap(),
                Decision::Deny(DenyReason::Expired)
            );
        }
        // 过期链接不应触发密码校验
        assert_eq!(hasher.verifications.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_expiry_instant_itself_is_expired() {
        let now = Utc::now();
        let link = record(now);
        assert_eq!(
            evaluate(&link, link.expires_at, None, &CountingHasher::default()).unwrap(),
            Decision::Deny(DenyReason::Expired)
        );
    }

    #[test]
    fn test_view_limit_checked_before_password() {
        let now = Utc::now();
        let hasher = CountingHasher::default();
        let mut link = protected(now);
        link.max_views = NonZeroU64::new(3);
        link.view_count = 3;

        assert_eq!(
            evaluate(&link, now, None, &hasher).unwrap(),
            Decision::Deny(DenyReason::ViewLimitReached)
        );
        assert_eq!(
            evaluate(&link, now, Some("secret"), &hasher).unwrap(),
            Decision::Deny(DenyReason::ViewLimitReached)
        );
        assert_eq!(hasher.verifications.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_password_outcomes() {
        let now = Utc::now();
        let hasher = CountingHasher::default();
        let link = protected(now);

        assert_eq!(
            evaluate(&link, now, None, &hasher).unwrap(),
            Decision::Deny(DenyReason::PasswordRequired)
        );
        assert_eq!(
            evaluate(&link, now, Some(""), &hasher).unwrap(),
            Decision::Deny(DenyReason::PasswordRequired)
        );
        assert_eq!(
            evaluate(&link, now, Some("wrong"), &hasher).unwrap(),
            Decision::Deny(DenyReason::PasswordIncorrect)
        );
        assert_eq!(
            evaluate(&link, now, Some("secret"), &hasher).unwrap(),
            Decision::Allow
        );
    }

    #[test]
    fn test_below_limit_is_allowed() {
        let now = Utc::now();
        let mut link = record(now);
        link.max_views = NonZeroU64::new(2);
        link.view_count = 1;
        assert!(
            evaluate(&link, now, None, &CountingHasher::default())
                .unwrap()
                .is_allowed()
        );
    }

    #[test]
    fn test_not_found_and_expired_share_message() {
        assert_eq!(DenyReason::NotFound.message(), DenyReason::Expired.message());
        assert!(DenyReason::PasswordRequired.is_password_challenge());
        assert!(!DenyReason::ViewLimitReached.is_password_challenge());
        assert_eq!(DenyReason::ViewLimitReached.as_ref(), "VIEW_LIMIT_REACHED");
    }
}
