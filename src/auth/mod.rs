//! Cross-origin session authentication.
//!
//! The browser presents a session credential (bearer header or cookie), the
//! middleware extracts it, the resolver matches it against the auth provider's
//! session store and the resulting user is attached to the request. Failures
//! keep their kind all the way to the response so clients can tell "log in",
//! "log in again" and "try again shortly" apart.

mod config;
mod cookie;
mod credential;
mod errors;
mod middleware;
mod resolver;
mod store;
mod transport;
mod types;

pub use config::{AuthConfig, ConfigError, DEFAULT_STORE_TIMEOUT, LookupKey, TransportPriority};
pub use cookie::{
    CookiePolicyViolation, SESSION_COOKIE_NAME, clear_session_cookie, cookie_policy_violation,
    get_cookie, session_cookie,
};
pub use credential::{Credential, bearer_token, extract_credential};
pub use errors::{ApiAuthError, AuthErrorKind};
pub use middleware::{AuthState, AuthUser, require_session};
pub use resolver::SessionResolver;
pub use store::{CredentialStore, StoreError};
pub use transport::{SiteRelation, Transport, attach_credential, select_transport, site_relation};
pub use types::{AuthenticatedUser, Session};
