//! Credential extraction from inbound requests.

use std::fmt;

use axum::http::{HeaderMap, header};

use super::config::TransportPriority;
use super::cookie::get_cookie;

/// Shortest value whose fingerprint includes a prefix.
const FINGERPRINT_MIN_LEN: usize = 8;

/// Raw proof-of-session value taken from a request.
///
/// Lives for one request. `Debug` output is redacted; use
/// [`fingerprint`](Credential::fingerprint) when a log line needs to tell
/// credentials apart.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Cookie(String),
    BearerToken(String),
}

impl Credential {
    pub fn value(&self) -> &str {
        match self {
            Self::Cookie(v) | Self::BearerToken(v) => v,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            Self::Cookie(_) => "cookie",
            Self::BearerToken(_) => "bearer",
        }
    }

    /// Short, non-reversible hint for logs: first four characters and length.
    /// Values of eight characters or fewer only show their length.
    pub fn fingerprint(&self) -> String {
        let value = self.value();
        let len = value.chars().count();
        if len <= FINGERPRINT_MIN_LEN {
            return format!("…({})", len);
        }
        let prefix: String = value.chars().take(4).collect();
        format!("{}…({})", prefix, len)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential::{}({})", self.source(), self.fingerprint())
    }
}

/// Token from an `Authorization: Bearer <token>` header.
///
/// Other schemes, an empty token and a token containing whitespace count as
/// no bearer credential.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}

/// Pick the credential a request carries.
///
/// When both a bearer header and a session cookie are present, `priority`
/// decides; the other value is ignored, never used as a fallback.
pub fn extract_credential(
    headers: &HeaderMap,
    cookie_name: &str,
    priority: TransportPriority,
) -> Option<Credential> {
    let bearer = bearer_token(headers).map(|t| Credential::BearerToken(t.to_string()));
    let cookie = get_cookie(headers, cookie_name)
        .filter(|v| !v.is_empty())
        .map(|v| Credential::Cookie(v.to_string()));

    match priority {
        TransportPriority::Bearer => bearer.or(cookie),
        TransportPriority::Cookie => cookie.or(bearer),
    }
}
