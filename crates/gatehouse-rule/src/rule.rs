//! The declarative access rule document.
//!
//! Rules arrive from an external management interface (REST API or file
//! loader) as JSON documents; this module defines their schema. Validation
//! and compilation happen in [`validate`](crate::validate) and
//! [`pattern`](crate::pattern) before a rule becomes active.

use gatehouse_core::Upstream;
use http::Method;
use serde::{Deserialize, Serialize};

/// Maximum length of a rule id.
pub const RULE_ID_MAX_LEN: usize = 190;

/// A single access rule, checked against every inbound request.
///
/// A rule binds a URL match pattern to an ordered chain of authenticators,
/// exactly one authorizer, exactly one mutator, and the upstream the request
/// is forwarded to when every stage passes.
///
/// The id is immutable once the rule is created; updates replace the whole
/// document under the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique id of the rule, at most 190 characters. The layout is up to
    /// the operator; the id is what management interfaces address.
    pub id: String,

    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The method set and URL pattern this rule matches.
    #[serde(rename = "match")]
    pub match_: RuleMatch,

    /// Authentication handlers, evaluated in array order. The first handler
    /// to return a positive result wins; handlers that decline pass to the
    /// next entry.
    pub authenticators: Vec<HandlerRef>,

    /// The authorization handler applied to the authenticated subject.
    pub authorizer: HandlerRef,

    /// The mutation handler that produces the forwarding request.
    pub mutator: HandlerRef,

    /// Where matching, authorized requests are forwarded to.
    pub upstream: Upstream,
}

/// The method set and path pattern used to select a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMatch {
    /// HTTP methods this rule applies to (e.g. `["GET", "POST"]`). Compared
    /// case-insensitively against the request method.
    pub methods: Vec<String>,

    /// The path pattern. Supports static segments, `{name}` parameters, a
    /// trailing `*` wildcard, and `<regex>` delimited segments - see
    /// [`PathPattern`](crate::PathPattern).
    pub path: String,
}

impl RuleMatch {
    /// Returns true if the method set contains the given method.
    #[must_use]
    pub fn matches_method(&self, method: &Method) -> bool {
        self.methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case(method.as_str()))
    }
}

/// A reference to a handler implementation plus its configuration.
///
/// `handler` names the registered implementation (e.g. `"anonymous"`,
/// `"allow"`, `"header"`); `config` is the handler-specific payload, opaque
/// to the rule layer and validated by the handler itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerRef {
    /// The registered handler kind.
    pub handler: String,

    /// Handler-specific configuration.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub config: serde_json::Value,
}

impl HandlerRef {
    /// Creates a handler reference with no configuration.
    #[must_use]
    pub fn new(handler: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            config: serde_json::Value::Null,
        }
    }

    /// Attaches configuration, builder style.
    #[must_use]
    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = config;
        self
    }
}
