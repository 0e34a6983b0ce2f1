//! Plugin API for delegated authorization backends.

use async_trait::async_trait;
use perses_security::SecurityContext;
use serde::{Deserialize, Serialize};

use crate::error::AuthorizationError;

/// One remote authorization question, already translated into the foreign vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessReview {
    pub identity: String,
    #[serde(default)]
    pub groups: Vec<String>,
    pub verb: String,
    /// `*` for the wildcard project.
    pub namespace: String,
    pub api_group: String,
    pub api_version: String,
    pub resource: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny,
    NoOpinion,
}

impl Decision {
    /// Only `Allow` counts as granted.
    #[must_use]
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub decision: Decision,
    #[serde(default)]
    pub reason: String,
}

impl ReviewResponse {
    #[must_use]
    pub fn new(decision: Decision, reason: impl Into<String>) -> Self {
        Self {
            decision,
            reason: reason.into(),
        }
    }
}

/// Remote authorization transport used by the delegated evaluator.
///
/// Implementations are not expected to observe cancellation themselves;
/// the evaluator races every call against the request's token.
#[async_trait]
pub trait RemoteAuthorizerPluginClient: Send + Sync {
    /// # Errors
    ///
    /// - `Transport` for network, timeout or server failures
    async fn authorize(&self, review: &AccessReview) -> Result<ReviewResponse, AuthorizationError>;

    /// Names of every concrete project known to the remote system.
    ///
    /// # Errors
    ///
    /// - `Transport` for network, timeout or server failures
    async fn list_projects(&self) -> Result<Vec<String>, AuthorizationError>;
}

/// Resolves the caller identity from the credentials of a request.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// `None` resolves to the anonymous context.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if the token is rejected
    /// - `Transport` if the identity provider cannot be reached
    async fn resolve(&self, bearer_token: Option<&str>) -> Result<SecurityContext, AuthorizationError>;
}
