//! Request descriptor types.
//!
//! The transport layer (reverse-proxy front end, decision API) translates
//! whatever it receives into an [`AccessRequest`]. The pipeline never touches
//! a live connection; it only sees this descriptor and produces a
//! [`MutatedRequest`] for the transport layer to forward.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};

/// An inbound HTTP request descriptor.
///
/// This is the unit of work handed to the pipeline executor: method, URI,
/// headers, and body of the request that hit the proxy. Query parameters are
/// carried on the URI but ignored during rule matching.
///
/// # Example
///
/// ```
/// use gatehouse_core::AccessRequest;
/// use http::Method;
///
/// let request = AccessRequest::new(Method::GET, "/api/foo".parse().unwrap());
/// assert_eq!(request.path(), "/api/foo");
/// ```
#[derive(Debug, Clone)]
pub struct AccessRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl AccessRequest {
    /// Creates a new request descriptor with no headers and an empty body.
    #[must_use]
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Adds a header, builder style.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the body, builder style.
    #[must_use]
    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the URI path component.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// The request as it should be forwarded to the upstream.
///
/// Produced by a mutator from an authorized [`RequestContext`]. The pipeline
/// guarantees that a `MutatedRequest` is only ever emitted inside an allowing
/// decision; a failed or partial mutation never leaves the executor.
///
/// [`RequestContext`]: crate::context::RequestContext
#[derive(Debug, Clone, PartialEq)]
pub struct MutatedRequest {
    /// The HTTP method to forward with.
    pub method: Method,
    /// The URI to forward (path and query of the original request).
    pub uri: Uri,
    /// Headers to forward, including any injected by mutators.
    pub headers: HeaderMap,
    /// The body to forward.
    pub body: Bytes,
}

impl MutatedRequest {
    /// Inserts or replaces a forwarded header.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header;

    #[test]
    fn test_request_accessors() {
        let request = AccessRequest::new(Method::POST, "/api/users?page=2".parse().unwrap())
            .with_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(Bytes::from_static(b"{}"));

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.path(), "/api/users");
        assert_eq!(request.uri().query(), Some("page=2"));
        assert_eq!(
            request.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(request.body().as_ref(), b"{}");
    }

    #[test]
    fn test_mutated_request_set_header() {
        let mut mutated = MutatedRequest {
            method: Method::GET,
            uri: "/".parse().unwrap(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        };
        mutated.set_header(
            HeaderName::from_static("x-subject"),
            HeaderValue::from_static("alice"),
        );
        assert_eq!(mutated.headers.get("x-subject").unwrap(), "alice");
    }
}
