//! Built-in mutation handlers.
//!
//! Mutators produce the forwarding request from an authorized context. The
//! `header` mutator is the workhorse: it injects configured headers into
//! the forwarded request, interpolating the authenticated subject. `noop`
//! forwards the request unchanged and `broken` always fails, which keeps
//! the fail-closed path honest in tests.

use crate::handler::{parse_config, BoxFuture, Mutator};
use gatehouse_core::{GatehouseError, MutatedRequest, RequestContext};
use http::{HeaderName, HeaderValue};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Forwards the request unchanged, apart from headers other handlers
/// accumulated on the context.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMutator;

impl Mutator for NoopMutator {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn validate(&self, _config: &serde_json::Value) -> Result<(), GatehouseError> {
        Ok(())
    }

    fn mutate<'a>(
        &'a self,
        ctx: &'a RequestContext,
        _config: &'a serde_json::Value,
    ) -> BoxFuture<'a, Result<MutatedRequest, GatehouseError>> {
        Box::pin(async move { Ok(ctx.forward_request()) })
    }
}

/// Configuration for [`HeaderMutator`].
#[derive(Debug, Default, Deserialize)]
struct HeaderConfig {
    /// Headers to inject. Values may reference `{{ subject }}`, replaced
    /// with the authenticated subject id.
    #[serde(default)]
    headers: BTreeMap<String, String>,
}

/// Injects configured identity headers into the forwarded request.
///
/// # Example config
///
/// ```json
/// { "headers": { "X-Subject": "{{ subject }}", "X-Tenant": "acme" } }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderMutator;

impl HeaderMutator {
    fn interpolate(template: &str, ctx: &RequestContext) -> String {
        let subject = ctx.subject().map_or("", |s| s.id());
        template
            .replace("{{ subject }}", subject)
            .replace("{{subject}}", subject)
    }
}

impl Mutator for HeaderMutator {
    fn name(&self) -> &'static str {
        "header"
    }

    fn validate(&self, config: &serde_json::Value) -> Result<(), GatehouseError> {
        let cfg: HeaderConfig = parse_config(self.name(), config)?;
        for name in cfg.headers.keys() {
            HeaderName::try_from(name.as_str()).map_err(|err| {
                GatehouseError::config(format!("handler \"header\": invalid header name {name:?}: {err}"))
            })?;
        }
        Ok(())
    }

    fn mutate<'a>(
        &'a self,
        ctx: &'a RequestContext,
        config: &'a serde_json::Value,
    ) -> BoxFuture<'a, Result<MutatedRequest, GatehouseError>> {
        Box::pin(async move {
            let cfg: HeaderConfig = parse_config(self.name(), config)?;
            let mut request = ctx.forward_request();

            for (name, template) in &cfg.headers {
                let name = HeaderName::try_from(name.as_str()).map_err(|err| {
                    GatehouseError::mutation(format!("invalid header name {name:?}: {err}"))
                })?;
                let rendered = Self::interpolate(template, ctx);
                let value = HeaderValue::try_from(rendered.as_str()).map_err(|err| {
                    GatehouseError::mutation(format!("invalid header value for {name:?}: {err}"))
                })?;
                request.set_header(name, value);
            }

            Ok(request)
        })
    }
}

/// Always fails. Exists so deployments and tests can verify the pipeline
/// never forwards when mutation breaks.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrokenMutator;

impl Mutator for BrokenMutator {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn validate(&self, _config: &serde_json::Value) -> Result<(), GatehouseError> {
        Ok(())
    }

    fn mutate<'a>(
        &'a self,
        _ctx: &'a RequestContext,
        _config: &'a serde_json::Value,
    ) -> BoxFuture<'a, Result<MutatedRequest, GatehouseError>> {
        Box::pin(async { Err(GatehouseError::mutation("mutator is broken")) })
    }
}
