//! Upstream destination description.

use serde::{Deserialize, Serialize};

/// The destination a matched, authorized, mutated request is forwarded to.
///
/// The forwarding itself is performed by the transport layer; the decision
/// core only resolves and reports the destination as part of an allowing
/// [`Decision`](crate::Decision).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upstream {
    /// The URL the request will be proxied to.
    pub url: String,

    /// If false (the default), the transport layer rewrites the Host header
    /// to the upstream's hostname before forwarding.
    #[serde(default)]
    pub preserve_host: bool,

    /// If set, this path prefix is stripped from the request path before
    /// forwarding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_path: Option<String>,
}

impl Upstream {
    /// Creates an upstream pointing at the given URL with default flags.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            preserve_host: false,
            strip_path: None,
        }
    }
}
