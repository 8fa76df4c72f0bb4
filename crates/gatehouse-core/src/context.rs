//! Per-request pipeline context.
//!
//! A [`RequestContext`] is created when a request enters the pipeline
//! executor and discarded once the decision is produced. It is owned by
//! exactly one execution - nothing in it is shared across requests.

use crate::request::{AccessRequest, MutatedRequest};
use crate::subject::Subject;
use http::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// State threaded through one pipeline execution.
///
/// The context carries the original request, the match result (rule id and
/// extracted path parameters), the authenticated [`Subject`] once an
/// authenticator grants it, headers accumulated for forwarding, and the
/// deadline handlers must honor.
///
/// # Example
///
/// ```
/// use gatehouse_core::{AccessRequest, RequestContext, Subject};
/// use http::Method;
///
/// let request = AccessRequest::new(Method::GET, "/api/foo".parse().unwrap());
/// let mut ctx = RequestContext::new(request);
/// ctx.set_subject(Subject::anonymous());
/// assert_eq!(ctx.subject().unwrap().id(), "anonymous");
/// ```
#[derive(Debug)]
pub struct RequestContext {
    request: AccessRequest,
    rule_id: Option<String>,
    params: HashMap<String, String>,
    subject: Option<Subject>,
    forward_headers: HeaderMap,
    deadline: Option<Instant>,
    started_at: Instant,
}

impl RequestContext {
    /// Creates a context for the given request with no deadline.
    #[must_use]
    pub fn new(request: AccessRequest) -> Self {
        Self {
            request,
            rule_id: None,
            params: HashMap::new(),
            subject: None,
            forward_headers: HeaderMap::new(),
            deadline: None,
            started_at: Instant::now(),
        }
    }

    /// Sets a deadline this far in the future, builder style.
    ///
    /// Handlers that perform external calls must finish before the deadline;
    /// the executor treats an overrun as a hard failure for that stage.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Returns the original request.
    #[must_use]
    pub fn request(&self) -> &AccessRequest {
        &self.request
    }

    /// Returns the matched rule id, once matching has run.
    #[must_use]
    pub fn rule_id(&self) -> Option<&str> {
        self.rule_id.as_deref()
    }

    /// Records the match result.
    ///
    /// This should only be called by the executor's match stage.
    pub fn set_matched(&mut self, rule_id: impl Into<String>, params: HashMap<String, String>) {
        self.rule_id = Some(rule_id.into());
        self.params = params;
    }

    /// Returns a path parameter extracted by the matcher.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Returns all extracted path parameters.
    #[must_use]
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Returns the authenticated subject, if one has been granted.
    #[must_use]
    pub fn subject(&self) -> Option<&Subject> {
        self.subject.as_ref()
    }

    /// Sets the authenticated subject.
    ///
    /// This should only be called by the executor's authentication stage.
    pub fn set_subject(&mut self, subject: Subject) {
        self.subject = Some(subject);
    }

    /// Adds a header to be injected into the forwarded request.
    ///
    /// Handlers accumulate forward headers here; they are merged over the
    /// original request headers when the forwarding request is built.
    pub fn set_forward_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.forward_headers.insert(name, value);
    }

    /// Returns the headers accumulated for forwarding.
    #[must_use]
    pub fn forward_headers(&self) -> &HeaderMap {
        &self.forward_headers
    }

    /// Builds the forwarding request from the original request plus the
    /// accumulated forward headers.
    #[must_use]
    pub fn forward_request(&self) -> MutatedRequest {
        let mut headers = self.request.headers().clone();
        for (name, value) in &self.forward_headers {
            headers.insert(name.clone(), value.clone());
        }
        MutatedRequest {
            method: self.request.method().clone(),
            uri: self.request.uri().clone(),
            headers,
            body: self.request.body().clone(),
        }
    }

    /// Returns the time left until the deadline.
    ///
    /// `None` means no deadline was set. A passed deadline yields
    /// `Duration::ZERO`.
    #[must_use]
    pub fn remaining_time(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Returns the elapsed time since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}
