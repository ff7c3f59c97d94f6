//! Reading and writing the `Cookie` / `Set-Cookie` headers.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;

/// One year, for preferences.
pub const LONG_LIVED: u64 = 60 * 60 * 24 * 365;

/// Value of the named cookie. Empty values count as absent.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value for a site-wide, HTTP-only cookie.
pub fn set_cookie(name: &str, value: &str, max_age: Option<u64>) -> String {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax");
    if let Some(seconds) = max_age {
        cookie.push_str(&format!("; Max-Age={seconds}"));
    }
    cookie
}

/// `Set-Cookie` value that removes the named cookie.
pub fn clear_cookie(name: &str) -> String {
    format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; session=abc123"));
        headers.append(COOKIE, HeaderValue::from_static("other=1; empty="));
        assert_eq!(cookie_value(&headers, "session").as_deref(), Some("abc123"));
        assert_eq!(cookie_value(&headers, "theme").as_deref(), Some("dark"));
        assert_eq!(cookie_value(&headers, "other").as_deref(), Some("1"));
        assert_eq!(cookie_value(&headers, "empty"), None);
        assert_eq!(cookie_value(&headers, "sess"), None);
    }

    #[test]
    fn test_set_and_clear() {
        assert_eq!(
            set_cookie("theme", "dark", Some(60)),
            "theme=dark; Path=/; HttpOnly; SameSite=Lax; Max-Age=60"
        );
        assert!(clear_cookie("session").contains("Max-Age=0"));
    }
}
