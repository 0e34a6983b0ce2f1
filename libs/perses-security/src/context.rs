use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

/// `SecurityContext` carries the already-resolved caller identity for one request.
///
/// Built by an `IdentityResolver` (JWT claims, Kubernetes `TokenReview`, ...) and passed
/// to every authorization query. An absent username denotes an anonymous caller.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SecurityContext {
    /// Login of the caller. `None` for anonymous callers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    /// Groups asserted by the identity provider, forwarded to remote authorizers.
    #[serde(default)]
    groups: Vec<String>,
    /// Original bearer token. Never serialized/persisted.
    /// Wrapped in `SecretString` so `Debug` redacts the value automatically.
    #[serde(skip)]
    bearer_token: Option<SecretString>,
    /// Request-scoped cancellation. Cancelled when the originating request is aborted.
    #[serde(skip)]
    cancellation: CancellationToken,
}

impl SecurityContext {
    /// Create a new `SecurityContext` builder
    #[must_use]
    pub fn builder() -> SecurityContextBuilder {
        SecurityContextBuilder::default()
    }

    /// Create an anonymous `SecurityContext` with no username and no groups
    #[must_use]
    pub fn anonymous() -> Self {
        SecurityContextBuilder::default().build()
    }

    /// Shortcut for an authenticated caller with no groups.
    #[must_use]
    pub fn for_user(username: &str) -> Self {
        SecurityContextBuilder::default().username(username).build()
    }

    /// Get the username, `None` when the caller is anonymous.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.username.is_none()
    }

    #[must_use]
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Get the original bearer token (for remote authorizer forwarding).
    #[must_use]
    pub fn bearer_token(&self) -> Option<&SecretString> {
        self.bearer_token.as_ref()
    }

    /// Token observed by remote round trips issued on behalf of this request.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

#[derive(Default)]
pub struct SecurityContextBuilder {
    username: Option<String>,
    groups: Vec<String>,
    bearer_token: Option<SecretString>,
    cancellation: Option<CancellationToken>,
}

impl SecurityContextBuilder {
    /// Set the username. An empty string is treated as anonymous.
    #[must_use]
    pub fn username(mut self, username: &str) -> Self {
        self.username = if username.is_empty() {
            None
        } else {
            Some(username.to_owned())
        };
        self
    }

    #[must_use]
    pub fn groups(mut self, groups: Vec<String>) -> Self {
        self.groups = groups;
        self
    }

    #[must_use]
    pub fn bearer_token(mut self, token: impl Into<SecretString>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    #[must_use]
    pub fn build(self) -> SecurityContext {
        SecurityContext {
            username: self.username,
            groups: self.groups,
            bearer_token: self.bearer_token,
            cancellation: self.cancellation.unwrap_or_default(),
        }
    }
}
