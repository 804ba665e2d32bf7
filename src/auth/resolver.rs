//! Session resolution.
//!
//! Turns the credential a request carries into an [`AuthenticatedUser`] or an
//! [`AuthErrorKind`]. Each call is one linear pass:
//!
//! 1. no credential: `Unauthenticated`
//! 2. look the credential up by token, then by session id if configured,
//!    all within one store timeout budget
//! 3. store failed or timed out: `ResolverUnavailable`
//! 4. nothing matched: `InvalidSession`
//! 5. matched but `expires_at <= now`: `SessionExpired`
//! 6. otherwise the session's user
//!
//! The resolver keeps no per-request state and never retries.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::config::{AuthConfig, ConfigError, LookupKey};
use super::credential::Credential;
use super::errors::AuthErrorKind;
use super::store::{CredentialStore, StoreError};
use super::types::{AuthenticatedUser, Session};

pub struct SessionResolver<S> {
    store: S,
    lookup_keys: Vec<LookupKey>,
    timeout: Duration,
}

impl<S: CredentialStore> SessionResolver<S> {
    /// Fails if `config` does not pass [`AuthConfig::validate`].
    pub fn new(store: S, config: &AuthConfig) -> Result<Self, ConfigError> {
        let config = config.clone().validate()?;
        Ok(Self {
            store,
            lookup_keys: config.lookup_keys,
            timeout: config.store_timeout,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve against the current time.
    pub async fn resolve(
        &self,
        credential: Option<&Credential>,
    ) -> Result<AuthenticatedUser, AuthErrorKind> {
        self.resolve_at(credential, Utc::now()).await
    }

    /// Resolve as of `now`.
    pub async fn resolve_at(
        &self,
        credential: Option<&Credential>,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedUser, AuthErrorKind> {
        let Some(credential) = credential else {
            debug!("No credential presented");
            return Err(AuthErrorKind::Unauthenticated);
        };

        let session = match tokio::time::timeout(self.timeout, self.lookup(credential)).await {
            Ok(Ok(Some(session))) => session,
            Ok(Ok(None)) => {
                debug!(
                    source = credential.source(),
                    credential = %credential.fingerprint(),
                    "No session matches credential"
                );
                return Err(AuthErrorKind::InvalidSession);
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Session lookup failed");
                return Err(AuthErrorKind::ResolverUnavailable);
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Session lookup timed out"
                );
                return Err(AuthErrorKind::ResolverUnavailable);
            }
        };

        if session.is_expired_at(now) {
            debug!(
                source = credential.source(),
                credential = %credential.fingerprint(),
                expires_at = %session.expires_at,
                "Session expired"
            );
            return Err(AuthErrorKind::SessionExpired);
        }

        Ok(AuthenticatedUser {
            user_id: session.user_id,
        })
    }

    /// Try each configured key in order; the first match wins.
    async fn lookup(&self, credential: &Credential) -> Result<Option<Session>, StoreError> {
        let value = credential.value();
        for key in &self.lookup_keys {
            let found = match key {
                LookupKey::Token => self.store.find_session_by_token(value).await?,
                LookupKey::Id => self.store.find_session_by_id(value).await?,
            };
            if found.is_some() {
                return Ok(found);
            }
        }
        Ok(None)
    }
}
