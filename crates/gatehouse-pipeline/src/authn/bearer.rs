//! The `bearer_token` authenticator.
//!
//! Credential extraction follows the fixed chain policy: a missing or
//! non-Bearer `Authorization` header is a *decline* (another authenticator
//! may be responsible), while a Bearer credential that fails introspection
//! is a *hard failure* that aborts the chain.

use crate::handler::{AuthnOutcome, Authenticator, BoxFuture};
use gatehouse_core::{GatehouseError, RequestContext, Subject};
use http::header;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves a bearer token to a subject.
///
/// The pipeline ships an in-memory [`StaticTokenStore`]; deployments that
/// introspect against an OAuth2 server implement this trait with a remote
/// client. Implementations must honor the caller's deadline - the executor
/// bounds the whole `authenticate` call with the request's remaining time.
pub trait TokenIntrospector: Send + Sync + 'static {
    /// Resolves a token.
    ///
    /// `Ok(Some(subject))` means the token is active, `Ok(None)` means it is
    /// unknown or revoked, and `Err` reports an introspection failure. Both
    /// of the latter abort the authenticator chain.
    fn introspect<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, Result<Option<Subject>, GatehouseError>>;
}

/// An in-memory token table, primarily for tests and static deployments.
#[derive(Debug, Default)]
pub struct StaticTokenStore {
    tokens: RwLock<HashMap<String, Subject>>,
}

impl StaticTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a token.
    pub fn insert(&self, token: impl Into<String>, subject: Subject) {
        self.tokens.write().insert(token.into(), subject);
    }
}

impl TokenIntrospector for StaticTokenStore {
    fn introspect<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, Result<Option<Subject>, GatehouseError>> {
        let subject = self.tokens.read().get(token).cloned();
        Box::pin(async move { Ok(subject) })
    }
}

/// Authenticates `Authorization: Bearer` credentials via a
/// [`TokenIntrospector`].
pub struct BearerTokenAuthenticator {
    introspector: Arc<dyn TokenIntrospector>,
}

impl BearerTokenAuthenticator {
    /// Creates the authenticator with the given introspector.
    #[must_use]
    pub fn new(introspector: Arc<dyn TokenIntrospector>) -> Self {
        Self { introspector }
    }

    fn bearer_token(ctx: &RequestContext) -> Option<&str> {
        let value = ctx.request().headers().get(header::AUTHORIZATION)?;
        value.to_str().ok()?.strip_prefix("Bearer ")
    }
}

impl Authenticator for BearerTokenAuthenticator {
    fn name(&self) -> &'static str {
        "bearer_token"
    }

    fn validate(&self, _config: &serde_json::Value) -> Result<(), GatehouseError> {
        Ok(())
    }

    fn authenticate<'a>(
        &'a self,
        ctx: &'a RequestContext,
        _config: &'a serde_json::Value,
    ) -> BoxFuture<'a, AuthnOutcome> {
        Box::pin(async move {
            let Some(token) = Self::bearer_token(ctx) else {
                return AuthnOutcome::Declined;
            };
            if token.is_empty() {
                return AuthnOutcome::Failed("empty bearer token".to_string());
            }

            match self.introspector.introspect(token).await {
                Ok(Some(subject)) => AuthnOutcome::Granted(subject),
                Ok(None) => AuthnOutcome::Failed("bearer token is not active".to_string()),
                Err(err) => AuthnOutcome::Failed(format!("token introspection failed: {err}")),
            }
        })
    }
}

impl std::fmt::Debug for BearerTokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerTokenAuthenticator").finish_non_exhaustive()
    }
}
