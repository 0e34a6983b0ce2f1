//! Plugin API implementations for the Kubernetes service.

use async_trait::async_trait;
use perses_security::SecurityContext;
use rbac_resolver_sdk::{
    AccessReview, AuthorizationError, IdentityResolver, RemoteAuthorizerPluginClient,
    ReviewResponse,
};

use super::service::Service;

#[async_trait]
impl RemoteAuthorizerPluginClient for Service {
    async fn authorize(&self, review: &AccessReview) -> Result<ReviewResponse, AuthorizationError> {
        self.review(review).await
    }

    async fn list_projects(&self) -> Result<Vec<String>, AuthorizationError> {
        self.namespaces().await
    }
}

#[async_trait]
impl IdentityResolver for Service {
    async fn resolve(
        &self,
        bearer_token: Option<&str>,
    ) -> Result<SecurityContext, AuthorizationError> {
        self.authenticate(bearer_token).await
    }
}
