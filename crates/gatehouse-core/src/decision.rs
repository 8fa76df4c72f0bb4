//! The pipeline's final verdict.

use crate::request::MutatedRequest;
use crate::upstream::Upstream;
use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Why a request was rejected.
///
/// Each status corresponds to one error exit of the pipeline state machine
/// and maps to a fixed HTTP status for the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionStatus {
    /// No rule matched the request's method and path.
    NoMatch,
    /// Every authenticator declined, or one failed hard.
    Unauthenticated,
    /// The rule's authorizer denied the subject.
    Unauthorized,
    /// The rule's mutator failed; the request is never forwarded partially
    /// mutated.
    MutationFailed,
}

impl RejectionStatus {
    /// Returns the HTTP status code the transport layer should answer with.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NoMatch => StatusCode::NOT_FOUND,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Unauthorized => StatusCode::FORBIDDEN,
            Self::MutationFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a stable machine-readable identifier for logs and envelopes.
    #[must_use]
    pub const fn reason_id(&self) -> &'static str {
        match self {
            Self::NoMatch => "no_rule_match",
            Self::Unauthenticated => "authentication_failed",
            Self::Unauthorized => "authorization_denied",
            Self::MutationFailed => "mutation_failed",
        }
    }
}

/// The final verdict of one pipeline execution.
///
/// A decision is always produced: the executor never lets a stage fault
/// escape. `Forward` carries everything the transport layer needs to proxy
/// the request; `Reject` carries the structured reason for the error
/// response.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// The request passed every stage and should be forwarded.
    Forward {
        /// The id of the rule that matched.
        rule_id: String,
        /// The destination to forward to.
        upstream: Upstream,
        /// The mutated request to forward.
        request: MutatedRequest,
    },

    /// The request was rejected and must not be forwarded.
    Reject {
        /// Which stage rejected the request.
        status: RejectionStatus,
        /// Human-readable reason.
        reason: String,
        /// The matched rule, if matching got that far.
        rule_id: Option<String>,
    },
}

impl Decision {
    /// Creates a rejecting decision.
    #[must_use]
    pub fn reject(
        status: RejectionStatus,
        reason: impl Into<String>,
        rule_id: Option<String>,
    ) -> Self {
        Self::Reject {
            status,
            reason: reason.into(),
            rule_id,
        }
    }

    /// Returns true if the request may be forwarded.
    #[must_use]
    pub fn allowed(&self) -> bool {
        matches!(self, Self::Forward { .. })
    }

    /// Returns the HTTP status code of this decision.
    ///
    /// `Forward` maps to 200 for decision-API deployments, where the verdict
    /// itself is the response body.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Forward { .. } => StatusCode::OK,
            Self::Reject { status, .. } => status.status_code(),
        }
    }

    /// Returns the matched rule id, if any.
    #[must_use]
    pub fn rule_id(&self) -> Option<&str> {
        match self {
            Self::Forward { rule_id, .. } => Some(rule_id),
            Self::Reject { rule_id, .. } => rule_id.as_deref(),
        }
    }

    /// Serializes the verdict into a wire envelope for the transport layer.
    ///
    /// The forwarded request itself is not part of the envelope; transports
    /// that proxy use the [`MutatedRequest`] directly.
    #[must_use]
    pub fn to_envelope(&self) -> serde_json::Value {
        match self {
            Self::Forward {
                rule_id, upstream, ..
            } => serde_json::json!({
                "allow": true,
                "rule_id": rule_id,
                "upstream": upstream,
            }),
            Self::Reject {
                status,
                reason,
                rule_id,
            } => serde_json::json!({
                "allow": false,
                "status": status.status_code().as_u16(),
                "reason_id": status.reason_id(),
                "reason": reason,
                "rule_id": rule_id,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{HeaderMap, Method};

    fn forward_decision() -> Decision {
        Decision::Forward {
            rule_id: "r1".to_string(),
            upstream: Upstream::new("http://svc.internal"),
            request: MutatedRequest {
                method: Method::GET,
                uri: "/api/foo".parse().unwrap(),
                headers: HeaderMap::new(),
                body: Bytes::new(),
            },
        }
    }

    #[test]
    fn test_rejection_status_codes() {
        assert_eq!(RejectionStatus::NoMatch.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            RejectionStatus::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            RejectionStatus::Unauthorized.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            RejectionStatus::MutationFailed.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_forward_decision() {
        let decision = forward_decision();
        assert!(decision.allowed());
        assert_eq!(decision.status_code(), StatusCode::OK);
        assert_eq!(decision.rule_id(), Some("r1"));
    }

    #[test]
    fn test_reject_decision() {
        let decision = Decision::reject(RejectionStatus::Unauthorized, "denied by policy", None);
        assert!(!decision.allowed());
        assert_eq!(decision.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(decision.rule_id(), None);
    }

    #[test]
    fn test_forward_envelope() {
        let envelope = forward_decision().to_envelope();
        assert_eq!(envelope["allow"], true);
        assert_eq!(envelope["rule_id"], "r1");
        assert_eq!(envelope["upstream"]["url"], "http://svc.internal");
    }

    #[test]
    fn test_reject_envelope() {
        let decision = Decision::reject(
            RejectionStatus::Unauthenticated,
            "no credentials",
            Some("r2".to_string()),
        );
        let envelope = decision.to_envelope();
        assert_eq!(envelope["allow"], false);
        assert_eq!(envelope["status"], 401);
        assert_eq!(envelope["reason_id"], "authentication_failed");
        assert_eq!(envelope["rule_id"], "r2");
    }
}
