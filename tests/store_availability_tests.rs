//! Behavior of the protected API when the credential store is slow or down.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Duration as ChronoDuration, Utc};
use common::{ScriptedStore, StoreBehavior, bearer, send};
use sessionbridge::{
    auth::{AuthConfig, ConfigError, LookupKey, Session},
    create_router,
};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tower::ServiceExt;

#[tokio::test]
async fn test_slow_store_is_unavailable_not_invalid() {
    let (store, calls) = ScriptedStore::new(StoreBehavior::Stall(Duration::from_millis(300)));
    let app = create_router(store, AuthConfig::default()).unwrap();

    let (status, json) = send(app, bearer("abc123")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error_kind"], "resolver_unavailable");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_store_error_is_never_reported_as_auth_failure() {
    let (store, calls) = ScriptedStore::new(StoreBehavior::Fail);
    let app = create_router(store, AuthConfig::default()).unwrap();

    let response = app.oneshot(bearer("abc123")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "1");
    assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error_kind"], "resolver_unavailable");
    assert!(json.get("message").is_none());
}

#[tokio::test]
async fn test_missing_credential_does_not_touch_store() {
    let (store, calls) = ScriptedStore::new(StoreBehavior::Fail);
    let app = create_router(store, AuthConfig::default()).unwrap();

    let request = Request::builder()
        .uri("/api/session")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error_kind"], "unauthenticated");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_configured_retries_are_attempted() {
    let (store, calls) = ScriptedStore::new(StoreBehavior::Fail);
    let app = create_router(store, AuthConfig::default().with_store_retries(1)).unwrap();

    let (status, _) = send(app, bearer("abc123")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_timeout_covers_id_fallback() {
    let (store, calls) = ScriptedStore::new(StoreBehavior::Stall(Duration::from_millis(150)));
    let config = AuthConfig::default()
        .with_lookup_keys(vec![LookupKey::Token, LookupKey::Id])
        .with_store_timeout_ms(200);
    let app = create_router(store, config).unwrap();

    let (status, json) = send(app, bearer("abc123")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error_kind"], "resolver_unavailable");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_custom_store_resolves_live_session() {
    let now = Utc::now();
    let (store, calls) = ScriptedStore::new(StoreBehavior::Sessions(vec![Session {
        session_id: "s1".to_string(),
        public_token: "abc123".to_string(),
        user_id: "u1".to_string(),
        expires_at: now + ChronoDuration::hours(1),
        created_at: now,
    }]));
    let app = create_router(store, AuthConfig::default()).unwrap();

    let (status, json) = send(app, bearer("abc123")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["user_id"], "u1");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_router_rejects_invalid_lookup_keys() {
    for (keys, expected) in [
        (vec![], ConfigError::EmptyLookupKeys),
        (vec![LookupKey::Id, LookupKey::Token], ConfigError::TokenLookupNotFirst),
        (
            vec![LookupKey::Token, LookupKey::Token],
            ConfigError::DuplicateLookupKey(LookupKey::Token),
        ),
    ] {
        let (store, calls) = ScriptedStore::new(StoreBehavior::Sessions(Vec::new()));
        let result = create_router(store, AuthConfig::default().with_lookup_keys(keys));
        assert_eq!(result.err(), Some(expected));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
