//! Minimal session cookie handling.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use std::time::Duration;

/// Returns the value of the cookie called `name`, if the request carries one.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// Builds a `Set-Cookie` value carrying a session id for `max_age`.
pub fn session_cookie(name: &str, id: &str, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{name}={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        max_age.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Builds a `Set-Cookie` value that makes the browser drop the cookie.
pub fn expired_cookie(name: &str, secure: bool) -> String {
    session_cookie(name, "", Duration::ZERO, secure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn finds_named_cookie() {
        let headers = headers("theme=dark; session_id=abc123; lang=en");
        assert_eq!(read_cookie(&headers, "session_id").as_deref(), Some("abc123"));
        assert_eq!(read_cookie(&headers, "lang").as_deref(), Some("en"));
    }

    #[test]
    fn missing_or_empty_cookie() {
        assert_eq!(read_cookie(&HeaderMap::new(), "session_id"), None);
        assert_eq!(read_cookie(&headers("session_id="), "session_id"), None);
        assert_eq!(read_cookie(&headers("other=1"), "session_id"), None);
    }

    #[test]
    fn builds_session_cookie() {
        let cookie = session_cookie("session_id", "abc", Duration::from_secs(60), false);
        assert_eq!(
            cookie,
            "session_id=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=60"
        );
        assert!(session_cookie("s", "abc", Duration::from_secs(1), true).ends_with("; Secure"));
    }

    #[test]
    fn expired_cookie_has_zero_max_age() {
        assert!(expired_cookie("session_id", false).contains("Max-Age=0"));
    }
}
