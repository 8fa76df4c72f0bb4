//! The `unauthorized` authenticator.

use crate::handler::{AuthnOutcome, Authenticator, BoxFuture};
use gatehouse_core::{GatehouseError, RequestContext};

/// Fails every request hard.
///
/// Rules use this to blocklist a route outright while keeping it in the
/// rule set, or as the terminal entry of a chain that must never fall
/// through to an implicit grant.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnauthorizedAuthenticator;

impl Authenticator for UnauthorizedAuthenticator {
    fn name(&self) -> &'static str {
        "unauthorized"
    }

    fn validate(&self, _config: &serde_json::Value) -> Result<(), GatehouseError> {
        Ok(())
    }

    fn authenticate<'a>(
        &'a self,
        _ctx: &'a RequestContext,
        _config: &'a serde_json::Value,
    ) -> BoxFuture<'a, AuthnOutcome> {
        Box::pin(async { AuthnOutcome::Failed("access is always denied on this route".to_string()) })
    }
}
