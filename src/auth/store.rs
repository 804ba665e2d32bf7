//! Read-only query interface to the auth provider's session storage.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::types::Session;

/// The credential store could not answer the query.
///
/// Distinct from "no such session": a lookup that errors out never means the
/// credential is invalid.
#[derive(Debug, Clone)]
pub struct StoreError(String);

impl StoreError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "credential store error: {}", self.0)
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self(e.to_string())
    }
}

/// Session lookups used by the resolver.
///
/// Implementations must not mutate session rows; the store is owned by the
/// auth provider and the bridge only reads it.
///
/// # Example
///
/// ```rust,ignore
/// impl CredentialStore for ProviderSessions {
///     async fn find_session_by_token(&self, token: &str) -> Result<Option<Session>, StoreError> {
///         self.client.session_by_token(token).await.map_err(StoreError::new)
///     }
///
///     async fn find_session_by_id(&self, id: &str) -> Result<Option<Session>, StoreError> {
///         self.client.session_by_id(id).await.map_err(StoreError::new)
///     }
/// }
/// ```
pub trait CredentialStore: Send + Sync + 'static {
    /// Look up a session by the token the client was given at sign-in.
    fn find_session_by_token(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<Session>, StoreError>> + Send;

    /// Look up a session by its storage key. Only consulted when the
    /// deployment is configured to expose raw session ids to clients.
    fn find_session_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Session>, StoreError>> + Send;
}

impl<T: CredentialStore> CredentialStore for Arc<T> {
    fn find_session_by_token(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<Session>, StoreError>> + Send {
        (**self).find_session_by_token(token)
    }

    fn find_session_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Session>, StoreError>> + Send {
        (**self).find_session_by_id(id)
    }
}
