//! Bounded expiring caches shared by the authorizer and the authenticator.

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;
use rbac_resolver_sdk::{AccessReview, Decision};
use sha2::{Digest, Sha256};

use super::review::Identity;

pub const MAX_CACHED_DECISIONS: u64 = 10_000;
pub const MAX_CACHED_IDENTITIES: u64 = 1_000;

/// Allow answers live for the allow TTL, deny and no-opinion answers for the deny TTL.
pub struct DecisionExpiry {
    allow_ttl: Duration,
    deny_ttl: Duration,
}

impl DecisionExpiry {
    #[must_use]
    pub fn new(allow_ttl: Duration, deny_ttl: Duration) -> Self {
        Self {
            allow_ttl,
            deny_ttl,
        }
    }

    #[must_use]
    pub fn ttl_for(&self, decision: Decision) -> Duration {
        match decision {
            Decision::Allow => self.allow_ttl,
            Decision::Deny | Decision::NoOpinion => self.deny_ttl,
        }
    }
}

impl Expiry<AccessReview, Decision> for DecisionExpiry {
    fn expire_after_create(
        &self,
        _key: &AccessReview,
        value: &Decision,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(self.ttl_for(*value))
    }

    fn expire_after_update(
        &self,
        _key: &AccessReview,
        value: &Decision,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(self.ttl_for(*value))
    }
}

#[must_use]
pub fn decision_cache(
    capacity: u64,
    allow_ttl: Duration,
    deny_ttl: Duration,
) -> Cache<AccessReview, Decision> {
    Cache::builder()
        .max_capacity(capacity)
        .expire_after(DecisionExpiry::new(allow_ttl, deny_ttl))
        .build()
}

/// Keyed by [`token_key`], never by the raw token.
#[must_use]
pub fn identity_cache(capacity: u64, ttl: Duration) -> Cache<String, Identity> {
    let builder = Cache::builder().max_capacity(capacity);
    if ttl.is_zero() {
        builder.build()
    } else {
        builder.time_to_live(ttl).build()
    }
}

/// Hex SHA-256 of a bearer token.
#[must_use]
pub fn token_key(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn review(verb: &str) -> AccessReview {
        AccessReview {
            identity: "user0".to_owned(),
            groups: Vec::new(),
            verb: verb.to_owned(),
            namespace: "project0".to_owned(),
            api_group: "perses.dev".to_owned(),
            api_version: "v1alpha1".to_owned(),
            resource: "persesdashboards".to_owned(),
        }
    }

    #[test]
    fn no_opinion_uses_the_deny_ttl() {
        let expiry = DecisionExpiry::new(Duration::from_secs(300), Duration::from_secs(30));
        assert_eq!(expiry.ttl_for(Decision::Allow), Duration::from_secs(300));
        assert_eq!(expiry.ttl_for(Decision::Deny), Duration::from_secs(30));
        assert_eq!(expiry.ttl_for(Decision::NoOpinion), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn deny_expires_before_allow() {
        let cache = decision_cache(
            MAX_CACHED_DECISIONS,
            Duration::from_secs(300),
            Duration::from_millis(50),
        );
        cache.insert(review("get"), Decision::Allow).await;
        cache.insert(review("delete"), Decision::Deny).await;
        assert_eq!(cache.get(&review("delete")).await, Some(Decision::Deny));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(cache.get(&review("get")).await, Some(Decision::Allow));
        assert_eq!(cache.get(&review("delete")).await, None);
    }

    #[tokio::test]
    async fn identities_expire_after_their_ttl() {
        let identity = Identity {
            username: "user0".to_owned(),
            groups: Vec::new(),
        };
        let cache = identity_cache(MAX_CACHED_IDENTITIES, Duration::from_millis(50));
        cache.insert(token_key("t0"), identity.clone()).await;
        assert_eq!(cache.get(&token_key("t0")).await, Some(identity));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(cache.get(&token_key("t0")).await, None);
    }

    #[tokio::test]
    async fn decision_cache_is_bounded() {
        let cache = decision_cache(16, Duration::from_secs(120), Duration::from_secs(120));
        for i in 0..200 {
            cache.insert(review(&format!("verb{i}")), Decision::Allow).await;
        }
        cache.run_pending_tasks().await;
        assert!(cache.entry_count() <= 16);
    }

    #[test]
    fn token_key_is_a_digest() {
        let key = token_key("secret-token");
        assert_eq!(key.len(), 64);
        assert!(!key.contains("secret-token"));
        assert_eq!(key, token_key("secret-token"));
        assert_ne!(key, token_key("other-token"));
    }
}
