#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use sessionbridge::{
    ServerConfig,
    auth::{AuthConfig, CredentialStore, Session, StoreError},
    create_app,
    db::Database,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tower::ServiceExt;

/// Create a test app backed by an in-memory database.
pub async fn create_test_app() -> (axum::Router, Database) {
    create_test_app_with(AuthConfig::default()).await
}

pub async fn create_test_app_with(auth: AuthConfig) -> (axum::Router, Database) {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db: db.clone(),
        auth,
    };
    (create_app(&config).expect("Invalid test config"), db)
}

/// Insert a session with fixed id/token for `user_id`, expiring at `expires_at`.
pub async fn insert_session(
    db: &Database,
    session_id: &str,
    token: &str,
    user_id: &str,
    expires_at: DateTime<Utc>,
) {
    db.users().ensure(user_id).await.unwrap();
    db.sessions()
        .insert(&Session {
            session_id: session_id.to_string(),
            public_token: token.to_string(),
            user_id: user_id.to_string(),
            expires_at,
            created_at: Utc::now() - ChronoDuration::days(1),
        })
        .await
        .unwrap();
}

/// Send a request and return status plus JSON body (Null if the body is empty).
pub async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

pub fn session_request() -> axum::http::request::Builder {
    Request::builder().method("GET").uri("/api/session")
}

pub fn bearer(token: &str) -> Request<Body> {
    session_request()
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn cookie(value: &str) -> Request<Body> {
    session_request()
        .header("cookie", value)
        .body(Body::empty())
        .unwrap()
}

/// Behavior of a scripted credential store.
#[derive(Clone)]
pub enum StoreBehavior {
    /// Answer from the given sessions
    Sessions(Vec<Session>),
    /// Every lookup fails
    Fail,
    /// Every lookup sleeps this long before answering from no sessions
    Stall(Duration),
}

/// Credential store with scripted behavior and a shared call counter.
pub struct ScriptedStore {
    behavior: StoreBehavior,
    calls: Arc<AtomicUsize>,
}

impl ScriptedStore {
    pub fn new(behavior: StoreBehavior) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                behavior,
                calls: calls.clone(),
            },
            calls,
        )
    }

    async fn find<F: Fn(&Session) -> bool>(&self, pred: F) -> Result<Option<Session>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            StoreBehavior::Sessions(sessions) => Ok(sessions.iter().find(|s| pred(s)).cloned()),
            StoreBehavior::Fail => Err(StoreError::new("connection refused")),
            StoreBehavior::Stall(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(None)
            }
        }
    }
}

impl CredentialStore for ScriptedStore {
    async fn find_session_by_token(&self, token: &str) -> Result<Option<Session>, StoreError> {
        self.find(|s| s.public_token == token).await
    }

    async fn find_session_by_id(&self, id: &str) -> Result<Option<Session>, StoreError> {
        self.find(|s| s.session_id == id).await
    }
}
