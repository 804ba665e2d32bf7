//! Session introspection.
//!
//! - GET `/session` - Return the user the presented credential resolves to

use axum::{Json, Router, response::IntoResponse, routing::get};

use crate::auth::AuthUser;

pub fn router() -> Router {
    Router::new().route("/session", get(current_session))
}

/// Lightweight check for clients: 200 with the user while the session is
/// live, otherwise the middleware's 401/503.
async fn current_session(AuthUser(user): AuthUser) -> impl IntoResponse {
    Json(user)
}
