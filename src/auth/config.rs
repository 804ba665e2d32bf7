//! Session resolution settings.

use std::fmt;
use std::time::Duration;

use super::cookie::SESSION_COOKIE_NAME;

/// Default budget for a single credential store round trip.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(250);

/// Which credential wins when a request carries both.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportPriority {
    #[default]
    Bearer,
    Cookie,
}

/// Session field a presented credential is matched against.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKey {
    /// The client-facing token returned at sign-in
    Token,
    /// The raw storage key, for providers that hand it to clients
    Id,
}

/// Configuration errors found during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyLookupKeys,
    DuplicateLookupKey(LookupKey),
    TokenLookupNotFirst,
    ZeroStoreTimeout,
    EmptyCookieName,
    /// Cookie priority on a cross-site deployment would rely on cookies that
    /// browsers may never send.
    CookiePriorityCrossSite,
    InvalidOrigin { name: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLookupKeys => write!(f, "lookup_keys must not be empty"),
            Self::DuplicateLookupKey(key) => write!(f, "lookup key {:?} listed twice", key),
            Self::TokenLookupNotFirst => write!(f, "lookup_keys must start with 'token'"),
            Self::ZeroStoreTimeout => write!(f, "store_timeout_ms must be greater than zero"),
            Self::EmptyCookieName => write!(f, "session cookie name must not be empty"),
            Self::CookiePriorityCrossSite => write!(
                f,
                "transport_priority=cookie is not allowed when frontend and backend origins differ"
            ),
            Self::InvalidOrigin { name, reason } => write!(f, "invalid {}: {}", name, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validated session resolution settings.
///
/// Construct with [`AuthConfig::default`] and the `with_*` methods, then call
/// [`validate`](AuthConfig::validate).
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub transport_priority: TransportPriority,
    /// Keys tried in order until one matches
    pub lookup_keys: Vec<LookupKey>,
    pub store_timeout: Duration,
    /// Extra attempts the middleware makes when the store is unavailable
    pub store_retries: u32,
    pub session_cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            transport_priority: TransportPriority::Bearer,
            lookup_keys: vec![LookupKey::Token],
            store_timeout: DEFAULT_STORE_TIMEOUT,
            store_retries: 0,
            session_cookie_name: SESSION_COOKIE_NAME.to_string(),
        }
    }
}

impl AuthConfig {
    #[must_use]
    pub fn with_transport_priority(mut self, priority: TransportPriority) -> Self {
        self.transport_priority = priority;
        self
    }

    #[must_use]
    pub fn with_lookup_keys(mut self, keys: Vec<LookupKey>) -> Self {
        self.lookup_keys = keys;
        self
    }

    #[must_use]
    pub fn with_store_timeout_ms(mut self, ms: u64) -> Self {
        self.store_timeout = Duration::from_millis(ms);
        self
    }

    #[must_use]
    pub fn with_store_retries(mut self, retries: u32) -> Self {
        self.store_retries = retries;
        self
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.session_cookie_name = name.into();
        self
    }

    /// Whether the raw session id may be matched after the token.
    pub fn id_fallback_enabled(&self) -> bool {
        self.lookup_keys.contains(&LookupKey::Id)
    }

    /// Check the settings.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.lookup_keys.is_empty() {
            return Err(ConfigError::EmptyLookupKeys);
        }
        if self.lookup_keys[0] != LookupKey::Token {
            return Err(ConfigError::TokenLookupNotFirst);
        }
        for (i, key) in self.lookup_keys.iter().enumerate() {
            if self.lookup_keys[..i].contains(key) {
                return Err(ConfigError::DuplicateLookupKey(*key));
            }
        }
        if self.store_timeout.is_zero() {
            return Err(ConfigError::ZeroStoreTimeout);
        }
        if self.session_cookie_name.trim().is_empty() {
            return Err(ConfigError::EmptyCookieName);
        }
        Ok(self)
    }
}
