//! The pipeline executor.
//!
//! One execution drives one request through the fixed stage order:
//!
//! ```text
//! Start -> Matched -> Authenticated -> Authorized -> Mutated -> Forward
//!    |         |            |              |            |
//!  NoMatch  Unauthenticated Unauthorized MutationFailed
//! ```
//!
//! Transitions are strictly forward and no state is revisited. Every exit -
//! success or error - produces a [`Decision`]; stage failures never
//! propagate past the executor. The pipeline fails closed: whenever a stage
//! cannot complete (handler failure, unknown handler kind, deadline
//! overrun), the request is rejected at that stage rather than forwarded.

use crate::handler::{AuthnOutcome, AuthzOutcome};
use crate::registry::HandlerRegistry;
use gatehouse_core::{
    AccessRequest, Decision, GatehouseError, RejectionStatus, RequestContext,
};
use gatehouse_rule::RuleStore;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// The stages of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PipelineStage {
    /// Resolve the rule for the request.
    Match = 1,
    /// Run the rule's authenticator chain.
    Authenticate = 2,
    /// Run the rule's authorizer.
    Authorize = 3,
    /// Run the rule's mutator.
    Mutate = 4,
    /// Emit the forwarding decision.
    Forward = 5,
}

impl PipelineStage {
    /// Returns the stage name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::Authenticate => "authenticate",
            Self::Authorize => "authorize",
            Self::Mutate => "mutate",
            Self::Forward => "forward",
        }
    }

    /// Returns all stages in execution order.
    #[must_use]
    pub const fn all() -> [PipelineStage; 5] {
        [
            Self::Match,
            Self::Authenticate,
            Self::Authorize,
            Self::Mutate,
            Self::Forward,
        ]
    }
}

/// Bounds a stage invocation by the request's remaining time.
///
/// No deadline means the future runs to completion; an overrun is reported
/// as a timeout error, which the caller treats as a hard failure for the
/// stage.
async fn bounded<T>(
    limit: Option<Duration>,
    stage: PipelineStage,
    future: impl Future<Output = T>,
) -> Result<T, GatehouseError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, future).await.map_err(|_| {
            GatehouseError::timeout(format!(
                "{} stage exceeded the request deadline",
                stage.name()
            ))
        }),
        None => Ok(future.await),
    }
}

/// Evaluates inbound requests against the active rule set.
///
/// The executor owns nothing per-request; it can be shared across any
/// number of concurrent evaluations. Each call to [`evaluate`] takes its
/// own immutable rule snapshot and its own [`RequestContext`].
///
/// [`evaluate`]: PipelineExecutor::evaluate
///
/// # Example
///
/// ```no_run
/// use gatehouse_pipeline::{HandlerRegistry, PipelineExecutor};
/// use gatehouse_rule::RuleStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(RuleStore::new());
/// let registry = Arc::new(HandlerRegistry::builtin());
/// let executor = PipelineExecutor::new(store, registry);
/// ```
#[derive(Debug)]
pub struct PipelineExecutor {
    store: Arc<RuleStore>,
    registry: Arc<HandlerRegistry>,
    timeout: Option<Duration>,
}

impl PipelineExecutor {
    /// Creates an executor over the given store and registry, with no
    /// request deadline.
    #[must_use]
    pub fn new(store: Arc<RuleStore>, registry: Arc<HandlerRegistry>) -> Self {
        Self {
            store,
            registry,
            timeout: None,
        }
    }

    /// Sets the per-request deadline, builder style.
    ///
    /// The deadline covers the whole evaluation; each stage gets whatever
    /// time remains when it starts.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the rule store this executor evaluates against.
    #[must_use]
    pub fn store(&self) -> &Arc<RuleStore> {
        &self.store
    }

    /// Evaluates one request to a decision.
    ///
    /// Never fails: every internal error becomes a rejecting [`Decision`].
    pub async fn evaluate(&self, request: AccessRequest) -> Decision {
        let decision_id = Uuid::now_v7();
        let mut ctx = RequestContext::new(request);
        if let Some(timeout) = self.timeout {
            ctx = ctx.with_timeout(timeout);
        }

        // Stage 1: match against an immutable snapshot of the rule set.
        let snapshot = self.store.snapshot();
        let Some(matched) =
            snapshot.match_request(ctx.request().method(), ctx.request().path())
        else {
            tracing::info!(
                %decision_id,
                method = %ctx.request().method(),
                path = %ctx.request().path(),
                granted = false,
                reason_id = RejectionStatus::NoMatch.reason_id(),
                "no rule matches the request"
            );
            return Decision::reject(
                RejectionStatus::NoMatch,
                format!(
                    "no rule matches {} {}",
                    ctx.request().method(),
                    ctx.request().path()
                ),
                None,
            );
        };

        let rule = matched.rule;
        ctx.set_matched(rule.id.clone(), matched.params);

        // Stage 2: authenticator chain, first positive result wins. A
        // decline moves to the next handler; a hard failure aborts.
        let mut authenticated = false;
        for handler_ref in &rule.authenticators {
            let Some(authenticator) = self.registry.authenticator(&handler_ref.handler) else {
                tracing::warn!(
                    %decision_id,
                    rule_id = %rule.id,
                    handler = %handler_ref.handler,
                    granted = false,
                    reason_id = "unknown_authentication_handler",
                    "rule references an unregistered authenticator"
                );
                return Decision::reject(
                    RejectionStatus::Unauthenticated,
                    format!("unknown authenticator {:?}", handler_ref.handler),
                    Some(rule.id.clone()),
                );
            };

            let outcome = bounded(
                ctx.remaining_time(),
                PipelineStage::Authenticate,
                authenticator.authenticate(&ctx, &handler_ref.config),
            )
            .await;

            match outcome {
                Ok(AuthnOutcome::Granted(subject)) => {
                    tracing::debug!(
                        %decision_id,
                        rule_id = %rule.id,
                        handler = %handler_ref.handler,
                        subject = %subject.id(),
                        "authenticator granted a subject"
                    );
                    ctx.set_subject(subject);
                    authenticated = true;
                    break;
                }
                Ok(AuthnOutcome::Declined) => {
                    tracing::trace!(
                        %decision_id,
                        rule_id = %rule.id,
                        handler = %handler_ref.handler,
                        "authenticator not responsible, trying next"
                    );
                }
                Ok(AuthnOutcome::Failed(reason)) => {
                    tracing::warn!(
                        %decision_id,
                        rule_id = %rule.id,
                        handler = %handler_ref.handler,
                        granted = false,
                        reason_id = RejectionStatus::Unauthenticated.reason_id(),
                        reason = %reason,
                        "authenticator failed hard, aborting chain"
                    );
                    return Decision::reject(
                        RejectionStatus::Unauthenticated,
                        reason,
                        Some(rule.id.clone()),
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        %decision_id,
                        rule_id = %rule.id,
                        handler = %handler_ref.handler,
                        granted = false,
                        reason_id = RejectionStatus::Unauthenticated.reason_id(),
                        "authenticator timed out"
                    );
                    return Decision::reject(
                        RejectionStatus::Unauthenticated,
                        err.to_string(),
                        Some(rule.id.clone()),
                    );
                }
            }
        }

        if !authenticated {
            tracing::info!(
                %decision_id,
                rule_id = %rule.id,
                granted = false,
                reason_id = RejectionStatus::Unauthenticated.reason_id(),
                "authenticator chain exhausted without a grant"
            );
            return Decision::reject(
                RejectionStatus::Unauthenticated,
                "no authenticator was responsible for the request",
                Some(rule.id.clone()),
            );
        }

        // Stage 3: exactly one authorizer, no fallback.
        let Some(authorizer) = self.registry.authorizer(&rule.authorizer.handler) else {
            return Self::reject_logged(
                decision_id,
                &rule.id,
                RejectionStatus::Unauthorized,
                format!("unknown authorizer {:?}", rule.authorizer.handler),
            );
        };

        let outcome = bounded(
            ctx.remaining_time(),
            PipelineStage::Authorize,
            authorizer.authorize(&ctx, &rule.authorizer.config),
        )
        .await;

        match outcome {
            Ok(AuthzOutcome::Allow) => {}
            Ok(AuthzOutcome::Deny(reason)) => {
                return Self::reject_logged(
                    decision_id,
                    &rule.id,
                    RejectionStatus::Unauthorized,
                    reason,
                );
            }
            Err(err) => {
                return Self::reject_logged(
                    decision_id,
                    &rule.id,
                    RejectionStatus::Unauthorized,
                    err.to_string(),
                );
            }
        }

        // Stage 4: mutation. A failure here must never leak a partially
        // mutated request, so any error path discards the context outright.
        let Some(mutator) = self.registry.mutator(&rule.mutator.handler) else {
            return Self::reject_logged(
                decision_id,
                &rule.id,
                RejectionStatus::MutationFailed,
                format!("unknown mutator {:?}", rule.mutator.handler),
            );
        };

        let mutated = match bounded(
            ctx.remaining_time(),
            PipelineStage::Mutate,
            mutator.mutate(&ctx, &rule.mutator.config),
        )
        .await
        {
            Ok(Ok(mutated)) => mutated,
            Ok(Err(err)) => {
                return Self::reject_logged(
                    decision_id,
                    &rule.id,
                    RejectionStatus::MutationFailed,
                    err.to_string(),
                );
            }
            Err(err) => {
                return Self::reject_logged(
                    decision_id,
                    &rule.id,
                    RejectionStatus::MutationFailed,
                    err.to_string(),
                );
            }
        };

        // Stage 5: forward.
        tracing::info!(
            %decision_id,
            rule_id = %rule.id,
            granted = true,
            subject = ctx.subject().map_or("", |s| s.id()),
            elapsed_ms = ctx.elapsed().as_millis() as u64,
            "request allowed"
        );
        Decision::Forward {
            rule_id: rule.id.clone(),
            upstream: rule.upstream.clone(),
            request: mutated,
        }
    }

    fn reject_logged(
        decision_id: Uuid,
        rule_id: &str,
        status: RejectionStatus,
        reason: String,
    ) -> Decision {
        tracing::info!(
            %decision_id,
            rule_id = %rule_id,
            granted = false,
            reason_id = status.reason_id(),
            reason = %reason,
            "request rejected"
        );
        Decision::reject(status, reason, Some(rule_id.to_string()))
    }
}
