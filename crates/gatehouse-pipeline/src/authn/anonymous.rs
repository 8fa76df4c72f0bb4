//! The `anonymous` authenticator.

use crate::handler::{parse_config, AuthnOutcome, Authenticator, BoxFuture};
use gatehouse_core::{GatehouseError, RequestContext, Subject};
use http::header;
use serde::Deserialize;

/// Configuration for [`AnonymousAuthenticator`].
#[derive(Debug, Default, Deserialize)]
struct AnonymousConfig {
    /// The subject to grant. Defaults to `"anonymous"`.
    #[serde(default)]
    subject: Option<String>,
}

/// Grants a configurable anonymous subject to requests that carry no
/// credentials.
///
/// Declines when an `Authorization` header is present, so a later (or
/// earlier) credential-aware authenticator gets to judge it instead of the
/// request silently passing as anonymous.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousAuthenticator;

impl Authenticator for AnonymousAuthenticator {
    fn name(&self) -> &'static str {
        "anonymous"
    }

    fn validate(&self, config: &serde_json::Value) -> Result<(), GatehouseError> {
        parse_config::<AnonymousConfig>(self.name(), config).map(|_| ())
    }

    fn authenticate<'a>(
        &'a self,
        ctx: &'a RequestContext,
        config: &'a serde_json::Value,
    ) -> BoxFuture<'a, AuthnOutcome> {
        Box::pin(async move {
            if ctx.request().headers().contains_key(header::AUTHORIZATION) {
                return AuthnOutcome::Declined;
            }

            match parse_config::<AnonymousConfig>(self.name(), config) {
                Ok(cfg) => {
                    let subject = cfg.subject.unwrap_or_else(|| "anonymous".to_string());
                    AuthnOutcome::Granted(Subject::new(subject))
                }
                Err(err) => AuthnOutcome::Failed(err.to_string()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::AccessRequest;
    use http::{HeaderValue, Method};

    fn ctx_without_credentials() -> RequestContext {
        RequestContext::new(AccessRequest::new(Method::GET, "/".parse().unwrap()))
    }

    fn ctx_with_credentials() -> RequestContext {
        let request = AccessRequest::new(Method::GET, "/".parse().unwrap())
            .with_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        RequestContext::new(request)
    }

    #[tokio::test]
    async fn test_grants_default_subject() {
        let ctx = ctx_without_credentials();
        let outcome = AnonymousAuthenticator
            .authenticate(&ctx, &serde_json::Value::Null)
            .await;
        assert_eq!(outcome, AuthnOutcome::Granted(Subject::anonymous()));
    }

    #[tokio::test]
    async fn test_grants_configured_subject() {
        let ctx = ctx_without_credentials();
        let config = serde_json::json!({ "subject": "guest" });
        let outcome = AnonymousAuthenticator.authenticate(&ctx, &config).await;
        assert_eq!(outcome, AuthnOutcome::Granted(Subject::new("guest")));
    }

    #[tokio::test]
    async fn test_declines_when_authorization_header_present() {
        let ctx = ctx_with_credentials();
        let outcome = AnonymousAuthenticator
            .authenticate(&ctx, &serde_json::Value::Null)
            .await;
        assert_eq!(outcome, AuthnOutcome::Declined);
    }

    #[test]
    fn test_validate_rejects_malformed_config() {
        assert!(AnonymousAuthenticator
            .validate(&serde_json::json!("just-a-string"))
            .is_err());
        assert!(AnonymousAuthenticator.validate(&serde_json::Value::Null).is_ok());
    }
}
