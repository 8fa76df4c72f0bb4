//! The authenticated subject.

use serde::{Deserialize, Serialize};

/// The identity produced by a successful authenticator.
///
/// A subject is the opaque identifier the credential resolved to (a user ID,
/// a client ID, `"anonymous"`, ...) plus any extra attributes the
/// authenticator extracted, such as token claims or session metadata. The
/// extra payload is handler-specific and flows untouched to authorizers and
/// mutators.
///
/// # Example
///
/// ```
/// use gatehouse_core::Subject;
///
/// let subject = Subject::new("user-123")
///     .with_extra(serde_json::json!({ "scope": "read" }));
/// assert_eq!(subject.id(), "user-123");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// The subject identifier.
    pub subject: String,

    /// Extra attributes attached by the authenticator.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub extra: serde_json::Value,
}

impl Subject {
    /// Creates a subject with the given identifier and no extra attributes.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            extra: serde_json::Value::Null,
        }
    }

    /// Creates the anonymous subject.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new("anonymous")
    }

    /// Attaches extra attributes, builder style.
    #[must_use]
    pub fn with_extra(mut self, extra: serde_json::Value) -> Self {
        self.extra = extra;
        self
    }

    /// Returns the subject identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.subject
    }

    /// Returns true if this subject carries no identifier.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subject.is_empty()
    }
}
