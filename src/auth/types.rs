//! Authentication data types.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A session record as issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Storage key, chosen by the provider
    pub session_id: String,
    /// Value handed to the client. Not guaranteed to equal `session_id`.
    pub public_token: String,
    /// Owning user
    pub user_id: String,
    /// The session is invalid from this instant on
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// A session is expired once `now` reaches `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Identity resolved for a single request.
///
/// Attached to the request extensions by the session middleware and read by
/// downstream handlers to scope data access. Lives only as long as the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub user_id: String,
}
