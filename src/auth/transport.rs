//! Token transport selection.
//!
//! Browsers drop or block cookies on cross-site requests depending on
//! third-party cookie policy and `SameSite`, so a frontend talking to an API on
//! another origin must send the session token in an `Authorization` header.
//! When both sides share an origin either mechanism works; the header is still
//! preferred so every deployment exercises the same path.

use axum::http::{HeaderMap, HeaderValue, header, header::InvalidHeaderValue};
use url::Url;

/// How the frontend and backend origins relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteRelation {
    SameOrigin,
    CrossSite,
}

/// Mechanism carrying the session token from browser to API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// `Authorization: Bearer <token>`
    BearerHeader,
    /// Session cookie
    Cookie,
}

/// Compare two origins (scheme, host, port).
///
/// Opaque origins (e.g. `file:` or `data:` URLs) never match anything,
/// including themselves.
pub fn site_relation(frontend: &Url, backend: &Url) -> SiteRelation {
    let frontend = frontend.origin();
    let backend = backend.origin();
    if frontend.is_tuple() && frontend == backend {
        SiteRelation::SameOrigin
    } else {
        SiteRelation::CrossSite
    }
}

/// Pick the transport for outbound requests.
///
/// Cross-site always gets the bearer header regardless of `preferred`.
pub fn select_transport(relation: SiteRelation, preferred: Transport) -> Transport {
    match relation {
        SiteRelation::CrossSite => Transport::BearerHeader,
        SiteRelation::SameOrigin => preferred,
    }
}

/// Write the credential onto an outbound request's headers.
///
/// For cookie transport the value is appended to any existing `Cookie` header.
pub fn attach_credential(
    headers: &mut HeaderMap,
    transport: Transport,
    token: &str,
    cookie_name: &str,
) -> Result<(), InvalidHeaderValue> {
    match transport {
        Transport::BearerHeader => {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Transport::Cookie => {
            let pair = format!("{}={}", cookie_name, token);
            let combined = match headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
                Some(existing) if !existing.trim().is_empty() => {
                    format!("{}; {}", existing.trim_end_matches([';', ' ']), pair)
                }
                _ => pair,
            };
            headers.insert(header::COOKIE, HeaderValue::from_str(&combined)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_same_origin() {
        assert_eq!(
            site_relation(
                &url("https://app.example.com/dashboard"),
                &url("https://app.example.com/api")
            ),
            SiteRelation::SameOrigin
        );
    }

    #[test]
    fn test_default_port_is_same_origin() {
        assert_eq!(
            site_relation(&url("https://app.example.com:443"), &url("https://app.example.com")),
            SiteRelation::SameOrigin
        );
    }

    #[test]
    fn test_different_host_is_cross_site() {
        assert_eq!(
            site_relation(&url("https://todo.vercel.app"), &url("https://todo-api.up.railway.app")),
            SiteRelation::CrossSite
        );
    }

    #[test]
    fn test_different_port_or_scheme_is_cross_site() {
        assert_eq!(
            site_relation(&url("http://localhost:3000"), &url("http://localhost:8000")),
            SiteRelation::CrossSite
        );
        assert_eq!(
            site_relation(&url("http://example.com"), &url("https://example.com")),
            SiteRelation::CrossSite
        );
    }

    #[test]
    fn test_opaque_origin_is_cross_site() {
        let file = url("file:///tmp/index.html");
        assert_eq!(site_relation(&file, &file), SiteRelation::CrossSite);
    }

    #[test]
    fn test_cross_site_forces_bearer() {
        assert_eq!(
            select_transport(SiteRelation::CrossSite, Transport::Cookie),
            Transport::BearerHeader
        );
        assert_eq!(
            select_transport(SiteRelation::CrossSite, Transport::BearerHeader),
            Transport::BearerHeader
        );
    }

    #[test]
    fn test_same_origin_honors_preference() {
        assert_eq!(
            select_transport(SiteRelation::SameOrigin, Transport::Cookie),
            Transport::Cookie
        );
        assert_eq!(
            select_transport(SiteRelation::SameOrigin, Transport::BearerHeader),
            Transport::BearerHeader
        );
    }

    #[test]
    fn test_attach_bearer() {
        let mut headers = HeaderMap::new();
        attach_credential(&mut headers, Transport::BearerHeader, "abc123", "session_token")
            .unwrap();
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer abc123");
        assert!(headers.get(header::COOKIE).is_none());
    }

    #[test]
    fn test_attach_cookie_appends() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        attach_credential(&mut headers, Transport::Cookie, "abc123", "session_token").unwrap();
        assert_eq!(
            headers.get(header::COOKIE).unwrap(),
            "theme=dark; session_token=abc123"
        );
        assert!(headers.get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_attach_rejects_header_injection() {
        let mut headers = HeaderMap::new();
        let result = attach_credential(
            &mut headers,
            Transport::BearerHeader,
            "abc\r\nX-Evil: 1",
            "session_token",
        );
        assert!(result.is_err());
    }
}
