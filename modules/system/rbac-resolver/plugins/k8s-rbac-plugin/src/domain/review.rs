//! Conversions between Perses reviews and the Kubernetes authorization/authentication objects.

use k8s_openapi::api::authentication::v1::{TokenReview, TokenReviewSpec, TokenReviewStatus};
use k8s_openapi::api::authorization::v1::{
    ResourceAttributes, SubjectAccessReview, SubjectAccessReviewSpec, SubjectAccessReviewStatus,
};
use perses_security::SecurityContext;
use rbac_resolver_sdk::{AccessReview, AuthorizationError, Decision, ReviewResponse, WILDCARD_PROJECT};

/// Caller identity asserted by a successful `TokenReview`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub groups: Vec<String>,
}

impl Identity {
    /// The resolved token is not kept on the context.
    #[must_use]
    pub fn into_context(self) -> SecurityContext {
        SecurityContext::builder()
            .username(&self.username)
            .groups(self.groups)
            .build()
    }
}

/// The wildcard project is reviewed across every namespace.
#[must_use]
pub fn subject_access_review(review: &AccessReview) -> SubjectAccessReview {
    let namespace = (review.namespace != WILDCARD_PROJECT).then(|| review.namespace.clone());
    SubjectAccessReview {
        spec: SubjectAccessReviewSpec {
            user: Some(review.identity.clone()),
            groups: (!review.groups.is_empty()).then(|| review.groups.clone()),
            resource_attributes: Some(ResourceAttributes {
                namespace,
                verb: Some(review.verb.clone()),
                group: Some(review.api_group.clone()),
                version: Some(review.api_version.clone()),
                resource: Some(review.resource.clone()),
                ..ResourceAttributes::default()
            }),
            ..SubjectAccessReviewSpec::default()
        },
        ..SubjectAccessReview::default()
    }
}

/// An authorizer may answer and still report an evaluation error, both are kept.
#[must_use]
pub fn decision(status: &SubjectAccessReviewStatus) -> ReviewResponse {
    if let Some(error) = status.evaluation_error.as_deref().filter(|e| !e.is_empty()) {
        tracing::warn!(error, "SubjectAccessReview reported an evaluation error");
    }
    let decision = if status.allowed {
        Decision::Allow
    } else if status.denied.unwrap_or(false) {
        Decision::Deny
    } else {
        Decision::NoOpinion
    };
    ReviewResponse::new(decision, status.reason.clone().unwrap_or_default())
}

#[must_use]
pub fn token_review(token: &str) -> TokenReview {
    TokenReview {
        spec: TokenReviewSpec {
            token: Some(token.to_owned()),
            audiences: None,
        },
        ..TokenReview::default()
    }
}

/// # Errors
///
/// - `Unauthorized` if the token was not authenticated or carries no username
pub fn identity(status: &TokenReviewStatus) -> Result<Identity, AuthorizationError> {
    if !status.authenticated.unwrap_or(false) {
        let reason = status
            .error
            .as_deref()
            .unwrap_or("token authentication failed");
        return Err(AuthorizationError::Unauthorized(reason.to_owned()));
    }
    let user = status.user.as_ref();
    let username = user
        .and_then(|u| u.username.clone())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            AuthorizationError::Unauthorized("authenticated token carries no username".to_owned())
        })?;
    let groups = user.and_then(|u| u.groups.clone()).unwrap_or_default();
    Ok(Identity { username, groups })
}
