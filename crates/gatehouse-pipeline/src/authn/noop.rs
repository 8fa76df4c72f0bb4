//! The `noop` authenticator.

use crate::handler::{AuthnOutcome, Authenticator, BoxFuture};
use gatehouse_core::{GatehouseError, RequestContext, Subject};

/// Grants an empty subject unconditionally.
///
/// Useful for routes where authentication is handled upstream or not
/// required at all; the pipeline still runs authorization and mutation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuthenticator;

impl Authenticator for NoopAuthenticator {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn validate(&self, _config: &serde_json::Value) -> Result<(), GatehouseError> {
        Ok(())
    }

    fn authenticate<'a>(
        &'a self,
        _ctx: &'a RequestContext,
        _config: &'a serde_json::Value,
    ) -> BoxFuture<'a, AuthnOutcome> {
        Box::pin(async { AuthnOutcome::Granted(Subject::new("")) })
    }
}
