//! Handler traits and outcome types.
//!
//! Authenticators, authorizers, and mutators are identified by a kind
//! string plus opaque configuration. The executor treats them as a
//! registered capability set: adding a new kind means registering another
//! implementation of one of these traits, never touching the executor.
//!
//! All three traits are object-safe and async via [`BoxFuture`], so
//! handlers that call out (token introspection, remote policy checks) fit
//! the same shape as the in-process built-ins.

use gatehouse_core::{GatehouseError, MutatedRequest, RequestContext, Subject};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;

/// A boxed future, the return shape of all handler invocations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The outcome of one authenticator invocation.
///
/// The three-way split is what makes the chain semantics work: `Declined`
/// means "no credential I am responsible for is present, try the next
/// handler", while `Failed` means "a credential was present but is invalid"
/// and aborts the chain. This distinction is fixed policy, not per-handler
/// choice.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthnOutcome {
    /// The credential was valid; the chain stops and the subject is set.
    Granted(Subject),
    /// Not responsible for this request; the chain continues.
    Declined,
    /// A credential was present but invalid; the chain aborts.
    Failed(String),
}

/// The outcome of the authorizer invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthzOutcome {
    /// The subject may access the matched resource.
    Allow,
    /// Access denied; terminal for the request.
    Deny(String),
}

/// An authentication handler.
///
/// Attempts to extract and validate a subject identity from the request in
/// the context. Invoked with the handler config from the matched rule.
pub trait Authenticator: Send + Sync + 'static {
    /// The kind string rules use to reference this handler.
    fn name(&self) -> &'static str;

    /// Validates a rule's configuration payload for this handler.
    ///
    /// Called at rule load time so that config errors never surface inside
    /// the pipeline.
    fn validate(&self, config: &serde_json::Value) -> Result<(), GatehouseError>;

    /// Attempts to authenticate the request.
    fn authenticate<'a>(
        &'a self,
        ctx: &'a RequestContext,
        config: &'a serde_json::Value,
    ) -> BoxFuture<'a, AuthnOutcome>;
}

/// An authorization handler.
///
/// Decides whether the authenticated subject may access the matched
/// resource. Exactly one authorizer runs per rule; there is no fallback
/// chain.
pub trait Authorizer: Send + Sync + 'static {
    /// The kind string rules use to reference this handler.
    fn name(&self) -> &'static str;

    /// Validates a rule's configuration payload for this handler.
    fn validate(&self, config: &serde_json::Value) -> Result<(), GatehouseError>;

    /// Decides access for the authenticated subject in the context.
    fn authorize<'a>(
        &'a self,
        ctx: &'a RequestContext,
        config: &'a serde_json::Value,
    ) -> BoxFuture<'a, AuthzOutcome>;
}

/// A mutation handler.
///
/// Produces the forwarding request from an authorized context, typically by
/// injecting identity headers or rewriting credentials. A mutation error is
/// terminal: the pipeline never forwards an unmutated or partially mutated
/// request.
pub trait Mutator: Send + Sync + 'static {
    /// The kind string rules use to reference this handler.
    fn name(&self) -> &'static str;

    /// Validates a rule's configuration payload for this handler.
    fn validate(&self, config: &serde_json::Value) -> Result<(), GatehouseError>;

    /// Produces the forwarding request.
    fn mutate<'a>(
        &'a self,
        ctx: &'a RequestContext,
        config: &'a serde_json::Value,
    ) -> BoxFuture<'a, Result<MutatedRequest, GatehouseError>>;
}

/// Deserializes an opaque handler config payload.
///
/// A `null` payload (the common "no config" case in rule documents) yields
/// the type's default.
pub(crate) fn parse_config<T>(
    handler: &'static str,
    config: &serde_json::Value,
) -> Result<T, GatehouseError>
where
    T: DeserializeOwned + Default,
{
    if config.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(config.clone()).map_err(|err| {
        GatehouseError::config(format!("handler {handler:?}: invalid configuration: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct DemoConfig {
        #[serde(default)]
        subject: Option<String>,
    }

    #[test]
    fn test_parse_config_null_yields_default() {
        let parsed: DemoConfig = parse_config("demo", &serde_json::Value::Null).unwrap();
        assert_eq!(parsed, DemoConfig::default());
    }

    #[test]
    fn test_parse_config_object() {
        let parsed: DemoConfig =
            parse_config("demo", &serde_json::json!({ "subject": "guest" })).unwrap();
        assert_eq!(parsed.subject.as_deref(), Some("guest"));
    }

    #[test]
    fn test_parse_config_rejects_wrong_shape() {
        let result: Result<DemoConfig, _> = parse_config("demo", &serde_json::json!([1, 2]));
        assert!(result.is_err());
    }
}
