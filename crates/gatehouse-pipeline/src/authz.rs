//! Built-in authorization handlers.
//!
//! `allow` grants every authenticated request; `deny` rejects every
//! request. Richer policy engines plug in through the
//! [`Authorizer`](crate::handler::Authorizer) trait without changes here.

use crate::handler::{AuthzOutcome, Authorizer, BoxFuture};
use gatehouse_core::{GatehouseError, RequestContext};

/// Allows every request that reaches the authorization stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAuthorizer;

impl Authorizer for AllowAuthorizer {
    fn name(&self) -> &'static str {
        "allow"
    }

    fn validate(&self, _config: &serde_json::Value) -> Result<(), GatehouseError> {
        Ok(())
    }

    fn authorize<'a>(
        &'a self,
        _ctx: &'a RequestContext,
        _config: &'a serde_json::Value,
    ) -> BoxFuture<'a, AuthzOutcome> {
        Box::pin(async { AuthzOutcome::Allow })
    }
}

/// Denies every request, regardless of the authenticated subject.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAuthorizer;

impl Authorizer for DenyAuthorizer {
    fn name(&self) -> &'static str {
        "deny"
    }

    fn validate(&self, _config: &serde_json::Value) -> Result<(), GatehouseError> {
        Ok(())
    }

    fn authorize<'a>(
        &'a self,
        _ctx: &'a RequestContext,
        _config: &'a serde_json::Value,
    ) -> BoxFuture<'a, AuthzOutcome> {
        Box::pin(async { AuthzOutcome::Deny("denied by policy".to_string()) })
    }
}
