//! Cookie parsing and session cookie attributes.

use axum::http::header;

use super::transport::SiteRelation;

/// Default name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "session_token";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(cookie_header) = value.to_str() else {
            continue;
        };
        for part in cookie_header.split(';') {
            if let Some((key, value)) = part.trim().split_once('=') {
                if key.trim() == name {
                    return Some(value.trim());
                }
            }
        }
    }
    None
}

/// Build the `Set-Cookie` value for a session cookie.
///
/// Cross-site cookies are only delivered with `SameSite=None`, which browsers
/// in turn only accept together with `Secure`, so `secure` is ignored there.
pub fn session_cookie(
    name: &str,
    token: &str,
    max_age_secs: i64,
    relation: SiteRelation,
    secure: bool,
) -> String {
    match relation {
        SiteRelation::CrossSite => format!(
            "{}={}; HttpOnly; Secure; SameSite=None; Path=/; Max-Age={}",
            name, token, max_age_secs
        ),
        SiteRelation::SameOrigin => {
            let secure = if secure { "; Secure" } else { "" };
            format!(
                "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
                name, token, max_age_secs, secure
            )
        }
    }
}

/// Build the `Set-Cookie` value that removes the session cookie.
///
/// Attributes must match the original cookie or cross-site browsers ignore it.
pub fn clear_session_cookie(name: &str, relation: SiteRelation, secure: bool) -> String {
    session_cookie(name, "", 0, relation, secure)
}

/// Why a `Set-Cookie` value would not work as a session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookiePolicyViolation {
    /// Readable from script
    MissingHttpOnly,
    /// Cross-site cookie without `Secure` is rejected by browsers
    MissingSecure,
    /// `Lax`, `Strict` or unset: the cookie is silently dropped cross-site
    SameSiteNotNone,
}

/// Check a `Set-Cookie` value against the attributes the deployment needs.
pub fn cookie_policy_violation(
    set_cookie: &str,
    relation: SiteRelation,
) -> Option<CookiePolicyViolation> {
    let mut http_only = false;
    let mut secure = false;
    let mut same_site = None;

    // First segment is name=value.
    for attr in set_cookie.split(';').skip(1) {
        let attr = attr.trim();
        let (key, value) = match attr.split_once('=') {
            Some((k, v)) => (k.trim(), Some(v.trim())),
            None => (attr, None),
        };
        if key.eq_ignore_ascii_case("httponly") {
            http_only = true;
        } else if key.eq_ignore_ascii_case("secure") {
            secure = true;
        } else if key.eq_ignore_ascii_case("samesite") {
            same_site = value.map(|v| v.to_ascii_lowercase());
        }
    }

    if !http_only {
        return Some(CookiePolicyViolation::MissingHttpOnly);
    }
    if relation == SiteRelation::CrossSite {
        if same_site.as_deref() != Some("none") {
            return Some(CookiePolicyViolation::SameSiteNotNone);
        }
        if !secure {
            return Some(CookiePolicyViolation::MissingSecure);
        }
    }
    None
}
