//! End-to-end pipeline tests through the public API: rules loaded from
//! JSON, evaluated against real requests, decisions checked stage by stage.

use gatehouse::prelude::*;
use gatehouse::pipeline::authn::{BearerTokenAuthenticator, StaticTokenStore};
use http::{header, HeaderValue, Method};
use std::sync::Arc;
use std::time::Duration;

fn engine(rules_json: &str) -> Gatehouse {
    let rules: Vec<Rule> = serde_json::from_str(rules_json).unwrap();
    Gatehouse::builder().with_rules(rules).build().unwrap()
}

fn get(path: &str) -> AccessRequest {
    AccessRequest::new(Method::GET, path.parse().unwrap())
}

fn post(path: &str) -> AccessRequest {
    AccessRequest::new(Method::POST, path.parse().unwrap())
}

const PUBLIC_API: &str = r#"[{
    "id": "api-public",
    "match": { "methods": ["GET"], "path": "/api/*" },
    "authenticators": [{ "handler": "anonymous" }],
    "authorizer": { "handler": "allow" },
    "mutator": { "handler": "noop" },
    "upstream": { "url": "http://backend.internal:4000" }
}]"#;

#[tokio::test]
async fn anonymous_rule_forwards_matching_request() {
    let gatehouse = engine(PUBLIC_API);

    match gatehouse.evaluate(get("/api/users")).await {
        Decision::Forward {
            rule_id, upstream, ..
        } => {
            assert_eq!(rule_id, "api-public");
            assert_eq!(upstream.url, "http://backend.internal:4000");
        }
        Decision::Reject { reason, .. } => panic!("rejected: {reason}"),
    }
}

#[tokio::test]
async fn method_outside_rule_set_is_no_match() {
    let gatehouse = engine(PUBLIC_API);

    let decision = gatehouse.evaluate(post("/api/users")).await;
    assert_eq!(decision.status_code(), http::StatusCode::NOT_FOUND);
    let envelope = decision.to_envelope();
    assert_eq!(envelope["allow"], false);
    assert_eq!(envelope["reason_id"], "no_rule_match");
    assert_eq!(envelope["rule_id"], serde_json::Value::Null);
}

#[tokio::test]
async fn deny_authorizer_rejects_authenticated_requests() {
    let gatehouse = engine(
        r#"[{
            "id": "blocked",
            "match": { "methods": ["GET"], "path": "/internal/*" },
            "authenticators": [{ "handler": "anonymous" }],
            "authorizer": { "handler": "deny" },
            "mutator": { "handler": "noop" },
            "upstream": { "url": "http://backend.internal" }
        }]"#,
    );

    let decision = gatehouse.evaluate(get("/internal/metrics")).await;
    assert_eq!(decision.status_code(), http::StatusCode::FORBIDDEN);
    assert_eq!(decision.rule_id(), Some("blocked"));
}

#[tokio::test]
async fn chain_declines_through_bearer_to_anonymous() {
    // No Authorization header: bearer_token declines, anonymous grants.
    let gatehouse = engine(
        r#"[{
            "id": "mixed",
            "match": { "methods": ["GET"], "path": "/api/*" },
            "authenticators": [
                { "handler": "bearer_token" },
                { "handler": "anonymous", "config": { "subject": "guest" } }
            ],
            "authorizer": { "handler": "allow" },
            "mutator": { "handler": "header", "config": { "headers": { "X-Subject": "{{ subject }}" } } },
            "upstream": { "url": "http://backend.internal" }
        }]"#,
    );

    match gatehouse.evaluate(get("/api/users")).await {
        Decision::Forward { request, .. } => {
            assert_eq!(request.headers.get("x-subject").unwrap(), "guest");
        }
        Decision::Reject { reason, .. } => panic!("rejected: {reason}"),
    }
}

#[tokio::test]
async fn invalid_bearer_credential_never_falls_through() {
    let gatehouse = engine(
        r#"[{
            "id": "mixed",
            "match": { "methods": ["GET"], "path": "/api/*" },
            "authenticators": [
                { "handler": "bearer_token" },
                { "handler": "anonymous" }
            ],
            "authorizer": { "handler": "allow" },
            "mutator": { "handler": "noop" },
            "upstream": { "url": "http://backend.internal" }
        }]"#,
    );

    let request = get("/api/users")
        .with_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer forged"));
    let decision = gatehouse.evaluate(request).await;
    assert_eq!(decision.status_code(), http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn anonymous_declines_requests_carrying_credentials() {
    // anonymous is for credential-less traffic only; with an Authorization
    // header present the chain has no responsible authenticator left.
    let gatehouse = engine(PUBLIC_API);

    let request = get("/api/users")
        .with_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer t1"));
    let decision = gatehouse.evaluate(request).await;
    assert_eq!(decision.status_code(), http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registered_bearer_tokens_flow_to_forward_headers() {
    let tokens = StaticTokenStore::new();
    tokens.insert("secret-token", Subject::new("alice"));

    let mut registry = HandlerRegistry::builtin();
    registry.register_authenticator(BearerTokenAuthenticator::new(Arc::new(tokens)));

    let rules: Vec<Rule> = serde_json::from_str(
        r#"[{
            "id": "api-users",
            "match": { "methods": ["GET"], "path": "/api/users/{id}" },
            "authenticators": [{ "handler": "bearer_token" }],
            "authorizer": { "handler": "allow" },
            "mutator": { "handler": "header", "config": { "headers": { "X-Subject": "{{ subject }}" } } },
            "upstream": { "url": "http://users.internal", "strip_path": "/api" }
        }]"#,
    )
    .unwrap();

    let gatehouse = Gatehouse::builder()
        .with_rules(rules)
        .with_registry(registry)
        .build()
        .unwrap();

    let request = get("/api/users/42").with_header(
        header::AUTHORIZATION,
        HeaderValue::from_static("Bearer secret-token"),
    );
    match gatehouse.evaluate(request).await {
        Decision::Forward {
            request, upstream, ..
        } => {
            assert_eq!(request.headers.get("x-subject").unwrap(), "alice");
            assert_eq!(upstream.strip_path.as_deref(), Some("/api"));
        }
        Decision::Reject { reason, .. } => panic!("rejected: {reason}"),
    }
}

#[tokio::test]
async fn most_specific_rule_wins_end_to_end() {
    let gatehouse = engine(
        r#"[
            {
                "id": "catch-all",
                "match": { "methods": ["GET"], "path": "/users/*" },
                "authenticators": [{ "handler": "anonymous" }],
                "authorizer": { "handler": "allow" },
                "mutator": { "handler": "noop" },
                "upstream": { "url": "http://wide.internal" }
            },
            {
                "id": "by-id",
                "match": { "methods": ["GET"], "path": "/users/{id}" },
                "authenticators": [{ "handler": "anonymous" }],
                "authorizer": { "handler": "allow" },
                "mutator": { "handler": "noop" },
                "upstream": { "url": "http://narrow.internal" }
            },
            {
                "id": "me",
                "match": { "methods": ["GET"], "path": "/users/me" },
                "authenticators": [{ "handler": "anonymous" }],
                "authorizer": { "handler": "deny" },
                "mutator": { "handler": "noop" },
                "upstream": { "url": "http://me.internal" }
            }
        ]"#,
    );

    assert_eq!(
        gatehouse.evaluate(get("/users/42")).await.rule_id(),
        Some("by-id")
    );
    assert_eq!(
        gatehouse.evaluate(get("/users/42/posts")).await.rule_id(),
        Some("catch-all")
    );
    // The static rule wins for /users/me and its deny authorizer applies.
    let me = gatehouse.evaluate(get("/users/me")).await;
    assert_eq!(me.rule_id(), Some("me"));
    assert_eq!(me.status_code(), http::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn broken_mutator_fails_closed_end_to_end() {
    let gatehouse = engine(
        r#"[{
            "id": "broken-route",
            "match": { "methods": ["GET"], "path": "/api/*" },
            "authenticators": [{ "handler": "anonymous" }],
            "authorizer": { "handler": "allow" },
            "mutator": { "handler": "broken" },
            "upstream": { "url": "http://backend.internal" }
        }]"#,
    );

    let decision = gatehouse.evaluate(get("/api/users")).await;
    assert!(!decision.allowed());
    assert_eq!(
        decision.status_code(),
        http::StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn reload_takes_effect_for_subsequent_requests() {
    let gatehouse = engine(PUBLIC_API);
    assert!(gatehouse.evaluate(get("/api/users")).await.allowed());

    let next: Vec<Rule> = serde_json::from_str(
        r#"[{
            "id": "api-locked",
            "match": { "methods": ["GET"], "path": "/api/*" },
            "authenticators": [{ "handler": "unauthorized" }],
            "authorizer": { "handler": "allow" },
            "mutator": { "handler": "noop" },
            "upstream": { "url": "http://backend.internal" }
        }]"#,
    )
    .unwrap();
    gatehouse.reload(next).unwrap();

    let decision = gatehouse.evaluate(get("/api/users")).await;
    assert_eq!(decision.status_code(), http::StatusCode::UNAUTHORIZED);
    assert_eq!(decision.rule_id(), Some("api-locked"));
}

#[tokio::test]
async fn evaluation_is_idempotent() {
    let gatehouse = engine(PUBLIC_API);
    let first = gatehouse.evaluate(get("/api/users")).await;
    let second = gatehouse.evaluate(get("/api/users")).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn deadline_applies_to_the_whole_pipeline() {
    // A generous deadline must not reject fast built-in handlers.
    let rules: Vec<Rule> = serde_json::from_str(PUBLIC_API).unwrap();
    let gatehouse = Gatehouse::builder()
        .with_rules(rules)
        .with_timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    assert!(gatehouse.evaluate(get("/api/users")).await.allowed());
}

#[tokio::test]
async fn forward_envelope_reports_upstream() {
    let gatehouse = engine(PUBLIC_API);
    let envelope = gatehouse.evaluate(get("/api/users")).await.to_envelope();
    assert_eq!(envelope["allow"], true);
    assert_eq!(envelope["rule_id"], "api-public");
    assert_eq!(envelope["upstream"]["url"], "http://backend.internal:4000");
}
