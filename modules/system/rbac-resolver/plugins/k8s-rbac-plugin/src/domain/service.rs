//! Kubernetes-backed authorizer and authenticator.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::anyhow;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use k8s_openapi::api::authentication::v1::TokenReview;
use k8s_openapi::api::authorization::v1::SubjectAccessReview;
use k8s_openapi::api::core::v1::Namespace;
use kube::Client;
use kube::api::{Api, ListParams, PostParams};
use moka::future::Cache;
use perses_security::SecurityContext;
use rbac_resolver_sdk::{AccessReview, AuthorizationError, Decision, ReviewResponse};

use super::expiry::{
    DecisionExpiry, MAX_CACHED_DECISIONS, MAX_CACHED_IDENTITIES, decision_cache, identity_cache,
    token_key,
};
use super::review::{self, Identity};
use crate::config::K8sRbacPluginConfig;

/// Client-side limiter shared by every API round trip.
///
/// # Errors
///
/// Zero `qps` or `burst`.
pub fn rate_limiter(qps: u32, burst: u32) -> anyhow::Result<DefaultDirectRateLimiter> {
    let qps = NonZeroU32::new(qps).ok_or_else(|| anyhow!("qps must be greater than zero"))?;
    let burst = NonZeroU32::new(burst).ok_or_else(|| anyhow!("burst must be greater than zero"))?;
    Ok(RateLimiter::direct(Quota::per_second(qps).allow_burst(burst)))
}

pub struct Service {
    client: Client,
    limiter: DefaultDirectRateLimiter,
    decisions: Cache<AccessReview, Decision>,
    identities: Cache<String, Identity>,
    expiry: DecisionExpiry,
    authenticator_ttl: Duration,
}

impl Service {
    /// # Errors
    ///
    /// Invalid rate limits.
    pub fn new(client: Client, cfg: &K8sRbacPluginConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client,
            limiter: rate_limiter(cfg.qps, cfg.burst)?,
            decisions: decision_cache(
                MAX_CACHED_DECISIONS,
                cfg.authorizer_allow_ttl,
                cfg.authorizer_deny_ttl,
            ),
            identities: identity_cache(MAX_CACHED_IDENTITIES, cfg.authenticator_ttl),
            expiry: DecisionExpiry::new(cfg.authorizer_allow_ttl, cfg.authorizer_deny_ttl),
            authenticator_ttl: cfg.authenticator_ttl,
        })
    }

    #[tracing::instrument(
        skip_all,
        fields(user = %access.identity, namespace = %access.namespace, resource = %access.resource, verb = %access.verb)
    )]
    pub(crate) async fn review(
        &self,
        access: &AccessReview,
    ) -> Result<ReviewResponse, AuthorizationError> {
        if let Some(decision) = self.decisions.get(access).await {
            tracing::trace!(?decision, "cached decision");
            return Ok(ReviewResponse::new(decision, "cached"));
        }

        self.limiter.until_ready().await;
        let api: Api<SubjectAccessReview> = Api::all(self.client.clone());
        let created = api
            .create(&PostParams::default(), &review::subject_access_review(access))
            .await
            .map_err(|e| transport("SubjectAccessReview", &e))?;
        let status = created.status.ok_or_else(|| {
            AuthorizationError::Transport("SubjectAccessReview returned no status".to_owned())
        })?;

        let response = review::decision(&status);
        tracing::debug!(decision = ?response.decision, reason = %response.reason, "reviewed");
        if !self.expiry.ttl_for(response.decision).is_zero() {
            self.decisions.insert(access.clone(), response.decision).await;
        }
        Ok(response)
    }

    pub(crate) async fn namespaces(&self) -> Result<Vec<String>, AuthorizationError> {
        self.limiter.until_ready().await;
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| transport("Namespace list", &e))?;
        Ok(list
            .items
            .into_iter()
            .filter_map(|ns| ns.metadata.name)
            .collect())
    }

    pub(crate) async fn authenticate(
        &self,
        bearer_token: Option<&str>,
    ) -> Result<SecurityContext, AuthorizationError> {
        let Some(token) = bearer_token.filter(|t| !t.is_empty()) else {
            return Ok(SecurityContext::anonymous());
        };

        let key = token_key(token);
        let identity = if let Some(identity) = self.identities.get(&key).await {
            identity
        } else {
            let identity = self.token_review(token).await?;
            if !self.authenticator_ttl.is_zero() {
                self.identities.insert(key, identity.clone()).await;
            }
            identity
        };

        Ok(identity.into_context())
    }

    async fn token_review(&self, token: &str) -> Result<Identity, AuthorizationError> {
        self.limiter.until_ready().await;
        let api: Api<TokenReview> = Api::all(self.client.clone());
        let created = api
            .create(&PostParams::default(), &review::token_review(token))
            .await
            .map_err(|e| transport("TokenReview", &e))?;
        let status = created.status.ok_or_else(|| {
            AuthorizationError::Transport("TokenReview returned no status".to_owned())
        })?;

        let identity = review::identity(&status)?;
        tracing::debug!(user = %identity.username, groups = ?identity.groups, "token authenticated");
        Ok(identity)
    }

}

fn transport(call: &str, e: &kube::Error) -> AuthorizationError {
    tracing::warn!(call, error = %e, "kubernetes API call failed");
    AuthorizationError::Transport(format!("{call}: {e}"))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn limiter_allows_the_configured_burst() {
        let limiter = rate_limiter(1, 2).unwrap();
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }

    #[test]
    fn zero_limits_are_rejected() {
        assert!(rate_limiter(0, 10).is_err());
        assert!(rate_limiter(10, 0).is_err());
    }
}
