mod health;
mod session;

use axum::{Router, middleware};

use crate::auth::{AuthState, CredentialStore, require_session};

/// Create the API router.
///
/// Routes registered on `protected` only run after the session middleware has
/// attached an `AuthenticatedUser`.
pub fn create_api_router<S: CredentialStore>(auth: AuthState<S>) -> Router {
    let protected = Router::new()
        .merge(session::router())
        .route_layer(middleware::from_fn_with_state(auth, require_session::<S>));

    Router::new().merge(protected).merge(health::router())
}
