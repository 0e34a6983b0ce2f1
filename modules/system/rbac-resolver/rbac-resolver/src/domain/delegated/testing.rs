//! Scripted remote authorizer used by the delegated evaluator tests.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;
use rbac_resolver_sdk::{
    AccessReview, AuthorizationError, Decision, RemoteAuthorizerPluginClient, ReviewResponse,
};
use tokio_util::sync::CancellationToken;

/// Denies everything that was not explicitly allowed and records every review.
#[derive(Default)]
pub struct ScriptedRemote {
    allowed: HashSet<(String, String, String)>,
    failing: HashSet<(String, String, Option<String>)>,
    projects: Vec<String>,
    listing_fails: bool,
    cancel_on: Option<(usize, CancellationToken)>,
    calls: Mutex<Vec<AccessReview>>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projects(mut self, projects: &[&str]) -> Self {
        self.projects = projects.iter().map(|p| (*p).to_owned()).collect();
        self
    }

    pub fn allow(mut self, namespace: &str, resource: &str, verb: &str) -> Self {
        self.allowed
            .insert((namespace.to_owned(), resource.to_owned(), verb.to_owned()));
        self
    }

    /// Every verb on `(namespace, resource)` fails at transport level.
    pub fn fail(mut self, namespace: &str, resource: &str) -> Self {
        self.failing
            .insert((namespace.to_owned(), resource.to_owned(), None));
        self
    }

    pub fn fail_verb(mut self, namespace: &str, resource: &str, verb: &str) -> Self {
        self.failing.insert((
            namespace.to_owned(),
            resource.to_owned(),
            Some(verb.to_owned()),
        ));
        self
    }

    pub fn fail_listing(mut self) -> Self {
        self.listing_fails = true;
        self
    }

    /// The `n`th review cancels `token` and then never completes.
    pub fn cancel_on_call(mut self, n: usize, token: CancellationToken) -> Self {
        self.cancel_on = Some((n, token));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn verbs_for(&self, namespace: &str, resource: &str) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|r| r.namespace == namespace && r.resource == resource)
            .map(|r| r.verb.clone())
            .collect()
    }

    fn fails(&self, review: &AccessReview) -> bool {
        let key = (review.namespace.clone(), review.resource.clone());
        self.failing.contains(&(key.0.clone(), key.1.clone(), None))
            || self
                .failing
                .contains(&(key.0, key.1, Some(review.verb.clone())))
    }
}

#[async_trait]
impl RemoteAuthorizerPluginClient for ScriptedRemote {
    async fn authorize(&self, review: &AccessReview) -> Result<ReviewResponse, AuthorizationError> {
        let n = {
            let mut calls = self.calls.lock();
            calls.push(review.clone());
            calls.len()
        };
        if let Some((at, token)) = &self.cancel_on
            && *at == n
        {
            token.cancel();
            std::future::pending::<()>().await;
        }
        if self.fails(review) {
            return Err(AuthorizationError::Transport("connection refused".to_owned()));
        }
        let key = (
            review.namespace.clone(),
            review.resource.clone(),
            review.verb.clone(),
        );
        let decision = if self.allowed.contains(&key) {
            Decision::Allow
        } else {
            Decision::Deny
        };
        Ok(ReviewResponse::new(decision, ""))
    }

    async fn list_projects(&self) -> Result<Vec<String>, AuthorizationError> {
        if self.listing_fails {
            return Err(AuthorizationError::Transport("namespaces unavailable".to_owned()));
        }
        Ok(self.projects.clone())
    }
}
