//! # Gatehouse
//!
//! Rule-driven request evaluation: match an inbound HTTP request against a
//! declarative rule set, authenticate it through the rule's handler chain,
//! authorize the resulting subject, mutate the request for forwarding, and
//! emit a [`Decision`].
//!
//! ## Quick Start
//!
//! ```
//! use gatehouse::prelude::*;
//! use http::Method;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), GatehouseError> {
//! let rules: Vec<Rule> = serde_json::from_str(
//!     r#"[{
//!         "id": "api-public",
//!         "match": { "methods": ["GET"], "path": "/api/*" },
//!         "authenticators": [{ "handler": "anonymous" }],
//!         "authorizer": { "handler": "allow" },
//!         "mutator": { "handler": "noop" },
//!         "upstream": { "url": "http://backend.internal:4000" }
//!     }]"#,
//! )
//! .map_err(|err| GatehouseError::config(err.to_string()))?;
//!
//! let gatehouse = Gatehouse::builder().with_rules(rules).build()?;
//!
//! let request = AccessRequest::new(Method::GET, "/api/users".parse().unwrap());
//! let decision = gatehouse.evaluate(request).await;
//! assert!(decision.allowed());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! Every request walks the same fixed pipeline; no stage can be skipped or
//! reordered:
//!
//! ```text
//! Request → Match → Authenticate → Authorize → Mutate → Decision
//!             |          |             |          |
//!            404        401           403        500   (fail closed)
//! ```
//!
//! The decision core never performs network I/O itself: [`Decision::Forward`]
//! carries the upstream and the mutated request for a transport layer to act
//! on, and [`Decision::to_envelope`] serializes the verdict for decision-API
//! deployments.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use gatehouse_core as core;
pub use gatehouse_pipeline as pipeline;
pub use gatehouse_rule as rule;

pub use gatehouse_core::{
    AccessRequest, Decision, GatehouseError, MutatedRequest, RejectionStatus, RequestContext,
    Subject, Upstream,
};
pub use gatehouse_pipeline::{HandlerRegistry, PipelineExecutor};
pub use gatehouse_rule::{Rule, RuleStore};

use std::sync::Arc;
use std::time::Duration;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use gatehouse::prelude::*;
/// ```
pub mod prelude {
    pub use gatehouse_core::{
        AccessRequest, Decision, GatehouseError, MutatedRequest, RejectionStatus, Subject,
        Upstream,
    };
    pub use gatehouse_pipeline::{
        AuthnOutcome, Authenticator, Authorizer, AuthzOutcome, HandlerRegistry, Mutator,
    };
    pub use gatehouse_rule::{HandlerRef, Rule, RuleMatch, RuleStore};

    pub use crate::{Gatehouse, GatehouseBuilder};
}

/// The assembled decision engine: a rule store, a handler registry, and the
/// pipeline executor wired over both.
///
/// Construct one with [`Gatehouse::builder`], then call
/// [`evaluate`](Gatehouse::evaluate) per request and
/// [`reload`](Gatehouse::reload) to swap the rule set at runtime. The value
/// is cheap to share behind an `Arc` across connection handlers.
#[derive(Debug)]
pub struct Gatehouse {
    store: Arc<RuleStore>,
    registry: Arc<HandlerRegistry>,
    executor: PipelineExecutor,
}

impl Gatehouse {
    /// Returns a builder with the built-in handler roster and no rules.
    #[must_use]
    pub fn builder() -> GatehouseBuilder {
        GatehouseBuilder::default()
    }

    /// Evaluates one request to a decision.
    ///
    /// Infallible by design: every failure mode is a rejecting
    /// [`Decision`], never an `Err`.
    pub async fn evaluate(&self, request: AccessRequest) -> Decision {
        self.executor.evaluate(request).await
    }

    /// Atomically replaces the active rule set.
    ///
    /// The new rules are validated (schema, patterns, handler references and
    /// configs) before the swap; on error the active set is untouched and
    /// in-flight evaluations keep their snapshot either way.
    pub fn reload(&self, rules: Vec<Rule>) -> Result<(), GatehouseError> {
        for rule in &rules {
            self.registry.validate_rule(rule)?;
        }
        self.store.replace(rules)
    }

    /// Returns the shared rule store.
    #[must_use]
    pub fn store(&self) -> &Arc<RuleStore> {
        &self.store
    }

    /// Returns the handler registry rules are validated against.
    #[must_use]
    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }
}

/// Builder for [`Gatehouse`].
///
/// # Example
///
/// ```
/// use gatehouse::{Gatehouse, HandlerRegistry};
/// use std::time::Duration;
///
/// let gatehouse = Gatehouse::builder()
///     .with_registry(HandlerRegistry::builtin())
///     .with_timeout(Duration::from_secs(5))
///     .build()
///     .unwrap();
/// assert!(gatehouse.store().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct GatehouseBuilder {
    rules: Vec<Rule>,
    registry: Option<HandlerRegistry>,
    timeout: Option<Duration>,
}

impl GatehouseBuilder {
    /// Adds one rule to the initial set.
    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds rules to the initial set.
    #[must_use]
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Uses the given registry instead of [`HandlerRegistry::builtin`].
    ///
    /// Start from `HandlerRegistry::builtin()` and register custom handlers
    /// on top to extend the roster rather than replace it.
    #[must_use]
    pub fn with_registry(mut self, registry: HandlerRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets a per-request deadline for the whole pipeline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validates the initial rules and assembles the engine.
    ///
    /// Fails if any rule is structurally invalid, references an unknown
    /// handler kind, or carries a config its handler rejects.
    pub fn build(self) -> Result<Gatehouse, GatehouseError> {
        let registry = Arc::new(self.registry.unwrap_or_else(HandlerRegistry::builtin));

        for rule in &self.rules {
            registry.validate_rule(rule)?;
        }

        let store = Arc::new(RuleStore::new());
        store.replace(self.rules)?;

        let mut executor = PipelineExecutor::new(store.clone(), registry.clone());
        if let Some(timeout) = self.timeout {
            executor = executor.with_timeout(timeout);
        }

        tracing::debug!(rules = store.len(), "decision engine assembled");
        Ok(Gatehouse {
            store,
            registry,
            executor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_rule::{HandlerRef, RuleMatch};

    fn rule(id: &str, path: &str) -> Rule {
        Rule {
            id: id.to_string(),
            description: None,
            match_: RuleMatch {
                methods: vec!["GET".to_string()],
                path: path.to_string(),
            },
            authenticators: vec![HandlerRef::new("anonymous")],
            authorizer: HandlerRef::new("allow"),
            mutator: HandlerRef::new("noop"),
            upstream: Upstream::new("http://upstream.internal"),
        }
    }

    #[test]
    fn test_build_validates_handler_references() {
        let mut bad = rule("r1", "/api/*");
        bad.authenticators = vec![HandlerRef::new("saml")];
        let err = Gatehouse::builder().with_rule(bad).build().unwrap_err();
        assert!(err.to_string().contains("unknown authenticator"));
    }

    #[test]
    fn test_reload_rejects_invalid_set_and_keeps_active() {
        let gatehouse = Gatehouse::builder()
            .with_rule(rule("r1", "/api/*"))
            .build()
            .unwrap();

        let mut bad = rule("r2", "/users/*");
        bad.mutator = HandlerRef::new("id_token");
        assert!(gatehouse.reload(vec![bad]).is_err());

        assert_eq!(gatehouse.store().len(), 1);
        assert!(gatehouse.store().get("r1").is_some());
    }

    #[test]
    fn test_reload_swaps_rule_set() {
        let gatehouse = Gatehouse::builder()
            .with_rule(rule("r1", "/api/*"))
            .build()
            .unwrap();
        gatehouse
            .reload(vec![rule("r2", "/users/*"), rule("r3", "/admin/*")])
            .unwrap();
        assert_eq!(gatehouse.store().len(), 2);
        assert!(gatehouse.store().get("r1").is_none());
    }
}
