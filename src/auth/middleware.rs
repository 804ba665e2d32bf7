//! Session middleware and extractor for protected routes.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::config::{AuthConfig, ConfigError};
use super::credential::{Credential, extract_credential};
use super::errors::{ApiAuthError, AuthErrorKind};
use super::resolver::SessionResolver;
use super::store::CredentialStore;
use super::types::AuthenticatedUser;

/// Shared state for the session middleware.
pub struct AuthState<S> {
    resolver: Arc<SessionResolver<S>>,
    config: Arc<AuthConfig>,
}

// Manual Clone: avoid derive adding an `S: Clone` bound.
impl<S> Clone for AuthState<S> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S: CredentialStore> AuthState<S> {
    /// Validate `config` and build the shared state.
    pub fn new(store: S, config: AuthConfig) -> Result<Self, ConfigError> {
        let config = config.validate()?;
        Ok(Self {
            resolver: Arc::new(SessionResolver::new(store, &config)?),
            config: Arc::new(config),
        })
    }

    pub fn resolver(&self) -> &SessionResolver<S> {
        &self.resolver
    }

    /// Resolve, retrying only while the store is unavailable and retries remain.
    async fn resolve(
        &self,
        credential: Option<&Credential>,
    ) -> Result<AuthenticatedUser, AuthErrorKind> {
        let mut attempt = 0;
        loop {
            match self.resolver.resolve(credential).await {
                Err(kind) if kind.is_transient() && attempt < self.config.store_retries => {
                    attempt += 1;
                    warn!(attempt, "Credential store unavailable, retrying");
                }
                result => return result,
            }
        }
    }
}

/// Middleware guarding protected routes.
///
/// Attaches the [`AuthenticatedUser`] to the request extensions on success;
/// otherwise answers 401 or 503 without calling the handler.
///
/// ```rust,ignore
/// let protected = Router::new()
///     .route("/tasks", get(list_tasks))
///     .route_layer(middleware::from_fn_with_state(auth, require_session::<SessionStore>));
/// ```
pub async fn require_session<S: CredentialStore>(
    State(state): State<AuthState<S>>,
    mut request: Request,
    next: Next,
) -> Response {
    let credential = extract_credential(
        request.headers(),
        &state.config.session_cookie_name,
        state.config.transport_priority,
    );

    match state.resolve(credential.as_ref()).await {
        Ok(user) => {
            debug!(user_id = %user.user_id, "Session resolved");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(kind) => {
            debug!(error_kind = %kind, "Request rejected");
            ApiAuthError::new(kind).into_response()
        }
    }
}

/// Extractor for handlers behind [`require_session`].
///
/// ```rust,ignore
/// async fn list_tasks(AuthUser(user): AuthUser) -> impl IntoResponse {
///     tasks_for(&user.user_id)
/// }
/// ```
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(AuthUser)
            .ok_or(ApiAuthError::new(AuthErrorKind::Unauthenticated))
    }
}
