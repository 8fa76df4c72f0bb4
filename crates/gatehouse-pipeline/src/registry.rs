//! The handler registry.
//!
//! Rules reference handlers by kind string; the registry resolves those
//! strings to implementations and validates rule configs against them at
//! load time. Registering a new handler kind is the only change needed to
//! extend the pipeline.

use crate::authn::{
    AnonymousAuthenticator, BearerTokenAuthenticator, NoopAuthenticator, StaticTokenStore,
    UnauthorizedAuthenticator,
};
use crate::authz::{AllowAuthorizer, DenyAuthorizer};
use crate::handler::{Authenticator, Authorizer, Mutator};
use crate::mutate::{BrokenMutator, HeaderMutator, NoopMutator};
use gatehouse_core::GatehouseError;
use gatehouse_rule::Rule;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry mapping handler kind strings to implementations.
///
/// # Example
///
/// ```
/// use gatehouse_pipeline::HandlerRegistry;
///
/// let registry = HandlerRegistry::builtin();
/// assert!(registry.authenticator("anonymous").is_some());
/// assert!(registry.authorizer("deny").is_some());
/// assert!(registry.mutator("header").is_some());
/// ```
#[derive(Default)]
pub struct HandlerRegistry {
    authenticators: HashMap<&'static str, Arc<dyn Authenticator>>,
    authorizers: HashMap<&'static str, Arc<dyn Authorizer>>,
    mutators: HashMap<&'static str, Arc<dyn Mutator>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in handler roster.
    ///
    /// Authenticators: `noop`, `anonymous`, `bearer_token` (backed by an
    /// empty [`StaticTokenStore`]), `unauthorized`. Authorizers: `allow`,
    /// `deny`. Mutators: `noop`, `header`, `broken`.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_authenticator(NoopAuthenticator);
        registry.register_authenticator(AnonymousAuthenticator);
        registry.register_authenticator(BearerTokenAuthenticator::new(Arc::new(
            StaticTokenStore::new(),
        )));
        registry.register_authenticator(UnauthorizedAuthenticator);
        registry.register_authorizer(AllowAuthorizer);
        registry.register_authorizer(DenyAuthorizer);
        registry.register_mutator(NoopMutator);
        registry.register_mutator(HeaderMutator);
        registry.register_mutator(BrokenMutator);
        registry
    }

    /// Registers an authenticator under its kind string.
    ///
    /// Re-registering a kind replaces the previous implementation.
    pub fn register_authenticator<A: Authenticator>(&mut self, authenticator: A) {
        self.authenticators
            .insert(authenticator.name(), Arc::new(authenticator));
    }

    /// Registers an authorizer under its kind string.
    pub fn register_authorizer<A: Authorizer>(&mut self, authorizer: A) {
        self.authorizers
            .insert(authorizer.name(), Arc::new(authorizer));
    }

    /// Registers a mutator under its kind string.
    pub fn register_mutator<M: Mutator>(&mut self, mutator: M) {
        self.mutators.insert(mutator.name(), Arc::new(mutator));
    }

    /// Looks up an authenticator by kind string.
    #[must_use]
    pub fn authenticator(&self, name: &str) -> Option<Arc<dyn Authenticator>> {
        self.authenticators.get(name).cloned()
    }

    /// Looks up an authorizer by kind string.
    #[must_use]
    pub fn authorizer(&self, name: &str) -> Option<Arc<dyn Authorizer>> {
        self.authorizers.get(name).cloned()
    }

    /// Looks up a mutator by kind string.
    #[must_use]
    pub fn mutator(&self, name: &str) -> Option<Arc<dyn Mutator>> {
        self.mutators.get(name).cloned()
    }

    /// Validates that every handler a rule references exists and accepts its
    /// configuration payload.
    ///
    /// Run at rule load time, alongside schema validation, so that unknown
    /// kinds and malformed configs never reach the pipeline.
    pub fn validate_rule(&self, rule: &Rule) -> Result<(), GatehouseError> {
        for handler_ref in &rule.authenticators {
            let authenticator = self.authenticator(&handler_ref.handler).ok_or_else(|| {
                GatehouseError::config(format!(
                    "rule {:?}: unknown authenticator {:?}",
                    rule.id, handler_ref.handler
                ))
            })?;
            authenticator.validate(&handler_ref.config)?;
        }

        let authorizer = self.authorizer(&rule.authorizer.handler).ok_or_else(|| {
            GatehouseError::config(format!(
                "rule {:?}: unknown authorizer {:?}",
                rule.id, rule.authorizer.handler
            ))
        })?;
        authorizer.validate(&rule.authorizer.config)?;

        let mutator = self.mutator(&rule.mutator.handler).ok_or_else(|| {
            GatehouseError::config(format!(
                "rule {:?}: unknown mutator {:?}",
                rule.id, rule.mutator.handler
            ))
        })?;
        mutator.validate(&rule.mutator.config)?;

        Ok(())
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("authenticators", &self.authenticators.keys().collect::<Vec<_>>())
            .field("authorizers", &self.authorizers.keys().collect::<Vec<_>>())
            .field("mutators", &self.mutators.keys().collect::<Vec<_>>())
            .finish()
    }
}
