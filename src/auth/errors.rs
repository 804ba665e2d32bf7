//! Authentication error types.

use std::fmt;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Outcome of a failed session resolution.
///
/// Each kind maps to a different client remediation, so the kinds are never
/// merged on the way to the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
    /// No bearer header and no session cookie on the request.
    Unauthenticated,
    /// A credential was presented but no session matches it.
    InvalidSession,
    /// A matching session exists but its expiry has passed.
    SessionExpired,
    /// The credential store could not be queried (failure or timeout).
    ResolverUnavailable,
}

impl AuthErrorKind {
    /// Wire code written to the `error_kind` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::InvalidSession => "invalid_session",
            Self::SessionExpired => "session_expired",
            Self::ResolverUnavailable => "resolver_unavailable",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::InvalidSession | Self::SessionExpired => {
                StatusCode::UNAUTHORIZED
            }
            Self::ResolverUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Human-readable message. `None` for transient failures, whose body only
    /// carries the kind.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Unauthenticated => Some("Please log in"),
            Self::InvalidSession => Some("Session not recognized, please log in"),
            Self::SessionExpired => Some("Your session ended, please log in again"),
            Self::ResolverUnavailable => None,
        }
    }

    /// True when the failure is transient and the same request may succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ResolverUnavailable)
    }
}

impl fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API authentication error (returns JSON with a machine-readable kind).
#[derive(Debug)]
pub struct ApiAuthError {
    pub(super) kind: AuthErrorKind,
}

impl ApiAuthError {
    pub fn new(kind: AuthErrorKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> AuthErrorKind {
        self.kind
    }
}

impl From<AuthErrorKind> for ApiAuthError {
    fn from(kind: AuthErrorKind) -> Self {
        Self::new(kind)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error_kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        let mut response = (
            self.kind.status_code(),
            Json(ErrorResponse {
                error_kind: self.kind.as_str(),
                message: self.kind.message(),
            }),
        )
            .into_response();

        // RFC 6750: no error code when the request carried no credential at all.
        let challenge = match self.kind {
            AuthErrorKind::Unauthenticated => Some("Bearer"),
            AuthErrorKind::InvalidSession | AuthErrorKind::SessionExpired => {
                Some("Bearer error=\"invalid_token\"")
            }
            AuthErrorKind::ResolverUnavailable => None,
        };

        let headers = response.headers_mut();
        match challenge {
            Some(value) => {
                headers.insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(value));
            }
            None => {
                headers.insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
            }
        }

        response
    }
}
